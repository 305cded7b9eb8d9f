/*
 * Responsibility
 * - Meaning the storage layer reports upward
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("{resource} already exists")]
    Conflict { resource: &'static str },
}

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error, resource: &'static str) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict { resource };
        }
        RepoError::Db(e)
    }
}

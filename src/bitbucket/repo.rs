use std::str::FromStr;

use crate::error::AppError;

const REPO_NAME_DELIMITER: char = '_';

/// Repository identity decoded from a mirrored repo name such as
/// `bitbucket_acme_widgets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub provider: String,
    pub owner: String,
    pub slug: String,
}

impl RepoRef {
    /// Split on the first two delimiters; the slug keeps any further underscores.
    ///
    /// Deliberately differs from splitting on every delimiter and taking the
    /// first three parts, which would truncate `bitbucket_acme_my_repo` to
    /// slug `my`.
    pub fn parse(repo_name: &str) -> Result<Self, AppError> {
        let mut parts = repo_name.splitn(3, REPO_NAME_DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(provider), Some(owner), Some(slug))
                if !provider.is_empty() && !owner.is_empty() && !slug.is_empty() =>
            {
                Ok(Self {
                    provider: provider.to_string(),
                    owner: owner.to_string(),
                    slug: slug.to_string(),
                })
            }
            _ => Err(AppError::MalformedRepoName(repo_name.to_string())),
        }
    }

    pub fn is_provider(&self, provider: &str) -> bool {
        self.provider.eq_ignore_ascii_case(provider)
    }

    /// `owner/slug`, as shown in Bitbucket
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.slug)
    }
}

impl FromStr for RepoRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

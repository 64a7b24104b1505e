//! Links into the Tangled web frontend

/// Builds clickable URLs for issues and pulls
#[derive(Debug, Clone)]
pub struct WebLinks {
    base: String,
}

impl WebLinks {
    pub fn new(appview_url: impl Into<String>) -> Self {
        let base: String = appview_url.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// `<base>/@owner/repo/<section>/<number>` for a normalized `owner/repo`
    fn item(&self, repo: &str, section: &str, number: u64) -> String {
        let (owner, name) = repo.split_once('/').unwrap_or((repo, ""));
        format!("{}/@{}/{}/{}/{}", self.base, owner, name, section, number)
    }

    pub fn issue(&self, repo: &str, number: u64) -> String {
        self.item(repo, "issues", number)
    }

    pub fn pull(&self, repo: &str, number: u64) -> String {
        self.item(repo, "pulls", number)
    }
}

impl Default for WebLinks {
    fn default() -> Self {
        Self::new("https://tangled.org")
    }
}

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use scraper::Html;
use thiserror::Error;
use tracing::debug;

use crate::model::CourseIdentity;
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} is not available")]
    Unavailable { url: String },
}

/// Source of parsed pages. Failures are reported, never retried here.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Html, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Html, FetchError> {
        debug!("GET {}", url);
        let request_err = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let resp = self.client.get(url).send().map_err(request_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let body = resp.text().map_err(request_err)?;
        Ok(Html::parse_document(&body))
    }
}

/// Refuses every request; used when parsing saved pages without network access.
pub struct OfflineFetcher;

impl Fetch for OfflineFetcher {
    fn fetch(&self, url: &str) -> Result<Html, FetchError> {
        Err(FetchError::Unavailable {
            url: url.to_string(),
        })
    }
}

/// URL templates of the registrar site, all relative to one base.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    level: String,
    lang: String,
}

impl Endpoints {
    pub fn new(base_url: &str, level: &str, lang: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("Invalid base URL {:?}", base_url))?;
        Ok(Endpoints {
            base,
            level: level.to_string(),
            lang: lang.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.base_url, &settings.level, &settings.lang)
    }

    /// Resolve a (usually relative) link target against the base URL.
    pub fn resolve(&self, href: &str) -> String {
        self.base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string())
    }

    pub fn degree_index(&self) -> String {
        self.resolve(&format!(
            "SU_DEGREE.p_list_degree?P_LEVEL={}&P_LANG={}&P_PRG_TYPE=",
            self.level, self.lang
        ))
    }

    pub fn select_term(&self, program: &str) -> String {
        self.resolve(&format!(
            "SU_DEGREE.p_select_term?P_PROGRAM={}&P_LANG={}&P_LEVEL={}",
            program, self.lang, self.level
        ))
    }

    pub fn degree_detail(&self, program: &str, term: &str) -> String {
        self.resolve(&format!(
            "SU_DEGREE.p_degree_detail?P_PROGRAM={}&P_LANG={}&P_LEVEL={}&P_TERM={}&P_SUBMIT=Select",
            program, self.lang, self.level, term
        ))
    }

    pub fn course_detail(&self, term: &str, course: &CourseIdentity) -> String {
        self.resolve(&format!(
            "bwckctlg.p_disp_course_detail?cat_term_in={}&subj_code_in={}&crse_numb_in={}",
            term, course.major, course.code
        ))
    }

    pub fn last_offered(&self, course: &CourseIdentity) -> String {
        self.resolve(&format!(
            "sabanci_www.p_get_courses?levl_code={}&subj_code={}&crse_numb={}&lang=eng",
            self.level, course.major, course.code
        ))
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Serves canned pages by exact URL and records every request.
    #[derive(Default)]
    pub struct MapFetcher {
        pages: HashMap<String, String>,
        pub requests: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
            self.pages.insert(url.into(), html.into());
            self
        }

        pub fn request_count(&self, url: &str) -> usize {
            self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    impl Fetch for MapFetcher {
        fn fetch(&self, url: &str) -> Result<Html, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .map(|html| Html::parse_document(html))
                .ok_or_else(|| FetchError::Unavailable {
                    url: url.to_string(),
                })
        }
    }
}

// Artemis endpoint catalogue
// Each logical operation lists the path variants to try, most preferred first.

use reqwest::Method;

/// Gateway prefix that the signature covers but the configured host already contains
pub const ARTEMIS_PREFIX: &str = "/artemis";

pub const DOOR_LIST_ADVANCED: &str = "/api/resource/v1/acsDoor/advance/acsDoorList";
pub const DOOR_LIST: &str = "/api/resource/v1/acsDoor/acsDoorList";
pub const VISITOR_INFO: &str = "/api/visitor/v1/visitor/visitorInfo";
pub const VISITOR_APPOINTMENT: &str = "/api/visitor/v1/appointment";
pub const COMMON_VERSION: &str = "/api/common/v1/version";

/// One upstream path variant.
///
/// `canonical_path` goes into the signed string, `execution_path` is appended
/// to the host. Only [`EndpointCandidate::url`] joins a path to the host, so
/// the canonical path can never end up in a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    canonical_path: String,
    execution_path: String,
}

impl EndpointCandidate {
    pub fn new(canonical_path: impl Into<String>, execution_path: impl Into<String>) -> Self {
        Self {
            canonical_path: canonical_path.into(),
            execution_path: execution_path.into(),
        }
    }

    /// Candidate behind the `/artemis` gateway
    pub fn artemis(execution_path: &str) -> Self {
        Self::new(format!("{}{}", ARTEMIS_PREFIX, execution_path), execution_path)
    }

    pub fn canonical_path(&self) -> &str {
        &self.canonical_path
    }

    pub fn execution_path(&self) -> &str {
        &self.execution_path
    }

    pub fn url(&self, upstream_host: &str) -> String {
        format!("{}{}", upstream_host.trim_end_matches('/'), self.execution_path)
    }
}

/// A logical upstream operation
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: &'static str,
    pub method: Method,
    pub candidates: Vec<EndpointCandidate>,
}

impl Operation {
    pub fn new(name: &'static str, method: Method, candidates: Vec<EndpointCandidate>) -> Self {
        Self {
            name,
            method,
            candidates,
        }
    }

    /// Linked door list. Older firmware only knows the plain path.
    pub fn linked_doors() -> Self {
        Self::new(
            "linked_doors",
            Method::POST,
            vec![
                EndpointCandidate::artemis(DOOR_LIST_ADVANCED),
                EndpointCandidate::artemis(DOOR_LIST),
            ],
        )
    }

    pub fn visitor_info() -> Self {
        Self::new(
            "visitor_info",
            Method::POST,
            vec![EndpointCandidate::artemis(VISITOR_INFO)],
        )
    }

    /// Not idempotent: a registration must never be sent to two variants
    /// after one of them accepted it, hence a single candidate.
    pub fn visitor_appointment() -> Self {
        Self::new(
            "visitor_appointment",
            Method::POST,
            vec![EndpointCandidate::artemis(VISITOR_APPOINTMENT)],
        )
    }

    pub fn version() -> Self {
        Self::new(
            "version",
            Method::POST,
            vec![EndpointCandidate::artemis(COMMON_VERSION)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artemis_candidate_paths() {
        let c = EndpointCandidate::artemis(VISITOR_INFO);
        assert_eq!(c.canonical_path(), "/artemis/api/visitor/v1/visitor/visitorInfo");
        assert_eq!(c.execution_path(), "/api/visitor/v1/visitor/visitorInfo");
    }

    #[test]
    fn test_url_uses_execution_path() {
        let c = EndpointCandidate::artemis(DOOR_LIST);
        assert_eq!(
            c.url("https://192.168.1.100:443/artemis"),
            "https://192.168.1.100:443/artemis/api/resource/v1/acsDoor/acsDoorList"
        );
        // A trailing slash on the host must not produce "//api"
        assert_eq!(
            c.url("https://192.168.1.100/artemis/"),
            "https://192.168.1.100/artemis/api/resource/v1/acsDoor/acsDoorList"
        );
    }

    #[test]
    fn test_linked_doors_prefers_advanced_path() {
        let op = Operation::linked_doors();
        assert_eq!(op.method, Method::POST);
        let paths: Vec<_> = op.candidates.iter().map(|c| c.execution_path()).collect();
        assert_eq!(paths, vec![DOOR_LIST_ADVANCED, DOOR_LIST]);
    }

    #[test]
    fn test_single_candidate_operations() {
        assert_eq!(Operation::visitor_info().candidates.len(), 1);
        assert_eq!(Operation::visitor_appointment().candidates.len(), 1);
        assert_eq!(
            Operation::version().candidates[0].canonical_path(),
            "/artemis/api/common/v1/version"
        );
    }
}

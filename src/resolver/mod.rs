// src/resolver/mod.rs
// =============================================================================
// This module turns one profile link into one numeric profile ID.
//
// Submodules:
// - eligibility: Which link values are worth a request at all
// - http: Follows the link over HTTP (redirects, browser headers, timeout)
// - extract: Finds the ID in the final URL or page body
//
// The batch runner composes these: eligible link -> resolve -> extract.
// =============================================================================

mod eligibility;
mod extract;
mod http;

pub use eligibility::{eligible_link, LINK_MARKERS};
pub use extract::extract_id;
pub use http::{HttpResolver, LinkResolver, ResolvedPage};

// Resolves a link and extracts its ID in one step
//
// Network failures and pages without an ID both come back as None.
// Callers cannot (and should not) tell the two apart.
pub async fn resolve_id<R>(resolver: &R, link: &str) -> Option<String>
where
    R: LinkResolver + ?Sized,
{
    let page = resolver.resolve(link).await?;
    extract_id(&page.final_url, &page.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // Remembers the exact strings it was asked to resolve
    #[derive(Default)]
    struct EchoResolver {
        asked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LinkResolver for EchoResolver {
        async fn resolve(&self, link: &str) -> Option<ResolvedPage> {
            self.asked.lock().unwrap().push(link.to_string());
            Some(ResolvedPage {
                final_url: format!("https://{}", link.trim()),
                body: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_resolve_id_hands_the_raw_link_to_the_resolver() {
        let resolver = EchoResolver::default();

        let id = resolve_id(&resolver, " facebook.com/profile.php?id=77 ").await;

        assert_eq!(id, Some("77".to_string()));
        assert_eq!(
            *resolver.asked.lock().unwrap(),
            vec![" facebook.com/profile.php?id=77 ".to_string()]
        );
    }

    #[tokio::test]
    async fn test_resolve_id_without_match_is_none() {
        let resolver = EchoResolver::default();
        assert_eq!(resolve_id(&resolver, "example.com/share/x").await, None);
    }
}

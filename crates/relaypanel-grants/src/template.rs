//! Client configuration rendering from a placeholder template.
//!
//! A template is plain text with `{Name}`-shaped placeholders. Rendering is a
//! string-substitution pass repeated per grant; the dashboard records and
//! fallback host live in an explicit [`RenderContext`] owned by the calling
//! session rather than in module state.

use rand::Rng;

use crate::grant::{Grant, ServerInfo};

/// Placeholder inserted when a grant lists no ports.
pub const UNKNOWN_PORT: &str = "unknown";

const PROXY_NAME_LEN: usize = 8;
const PROXY_NAME_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Everything placeholder resolution needs besides the grant itself.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// Known backend servers, matched against `Grant::server`
    pub servers: &'a [ServerInfo],
    /// Host used when the grant's server has no dashboard record
    pub fallback_host: &'a str,
    /// Port used when the grant's server has no dashboard record
    pub fallback_port: u16,
}

/// Rendering refusal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The grant collection was empty; there is nothing to export.
    #[error("no grants selected")]
    NothingSelected,
}

/// Fresh random alphanumeric proxy name. Uniqueness is best-effort; callers
/// that need collision-free names must check themselves.
pub fn proxy_name() -> String {
    let mut rng = rand::thread_rng();
    (0..PROXY_NAME_LEN)
        .map(|_| PROXY_NAME_CHARSET[rng.gen_range(0..PROXY_NAME_CHARSET.len())] as char)
        .collect()
}

/// Substitute every placeholder in `template` for one grant.
pub fn render_one(template: &str, grant: &Grant, ctx: &RenderContext<'_>) -> String {
    let matched = ctx.servers.iter().find(|s| s.name == grant.server);
    let (host, port) = match matched {
        Some(server) => (server.dashboard_addr.as_str(), server.dashboard_port),
        None => (ctx.fallback_host, ctx.fallback_port),
    };

    let port_text = grant
        .ports
        .first()
        .map(|p| p.to_string())
        .unwrap_or_else(|| UNKNOWN_PORT.to_string());

    template
        .replace("{ServerIP}", host)
        .replace("{ServerPort}", &port.to_string())
        .replace("{User}", &grant.user)
        .replace("{token}", &grant.token)
        .replace("{Port}", &port_text)
        .replace("{ProxyName}", &proxy_name())
}

/// Render the whole selection: one block per grant with a header comment,
/// blocks separated by a blank line.
pub fn render_all(
    template: &str,
    grants: &[Grant],
    ctx: &RenderContext<'_>,
) -> Result<String, RenderError> {
    if grants.is_empty() {
        return Err(RenderError::NothingSelected);
    }

    let blocks: Vec<String> = grants
        .iter()
        .map(|grant| {
            format!(
                "### relayc_{}.ini ###\n{}\n",
                grant.user,
                render_one(template, grant, ctx)
            )
        })
        .collect();

    Ok(blocks.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::PortValue;

    fn grant(user: &str, server: &str, ports: Vec<PortValue>) -> Grant {
        Grant {
            user: user.to_string(),
            token: "tok".to_string(),
            comment: String::new(),
            server: server.to_string(),
            ports,
            domains: vec![],
            subdomains: vec![],
            create_date: String::new(),
            expire_date: String::new(),
            enable: true,
        }
    }

    fn servers() -> Vec<ServerInfo> {
        vec![ServerInfo {
            name: "eu-1".to_string(),
            dashboard_addr: "10.0.0.5".to_string(),
            dashboard_port: 7500,
        }]
    }

    #[test]
    fn substitutes_user_and_port() {
        let servers = servers();
        let ctx = RenderContext {
            servers: &servers,
            fallback_host: "panel.local",
            fallback_port: 8080,
        };
        let grant = grant("alice", "eu-1", vec![PortValue::Num(8080)]);
        assert_eq!(render_one("{User}:{Port}", &grant, &ctx), "alice:8080");
    }

    #[test]
    fn matched_server_wins_over_fallback() {
        let servers = servers();
        let ctx = RenderContext {
            servers: &servers,
            fallback_host: "panel.local",
            fallback_port: 8080,
        };
        let on_eu = grant("a", "eu-1", vec![]);
        let elsewhere = grant("b", "unknown-server", vec![]);
        assert_eq!(
            render_one("{ServerIP}:{ServerPort}", &on_eu, &ctx),
            "10.0.0.5:7500"
        );
        assert_eq!(
            render_one("{ServerIP}:{ServerPort}", &elsewhere, &ctx),
            "panel.local:8080"
        );
    }

    #[test]
    fn empty_ports_render_the_unknown_marker() {
        let servers = servers();
        let ctx = RenderContext {
            servers: &servers,
            fallback_host: "panel.local",
            fallback_port: 8080,
        };
        let grant = grant("alice", "eu-1", vec![]);
        assert_eq!(render_one("{Port}", &grant, &ctx), UNKNOWN_PORT);
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let servers = servers();
        let ctx = RenderContext {
            servers: &servers,
            fallback_host: "panel.local",
            fallback_port: 8080,
        };
        let grant = grant("alice", "eu-1", vec![PortValue::Num(80)]);
        assert_eq!(render_one("{User} {User}", &grant, &ctx), "alice alice");
    }

    #[test]
    fn proxy_names_are_alphanumeric() {
        let name = proxy_name();
        assert_eq!(name.len(), 8);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn selection_renders_with_headers_and_separators() {
        let servers = servers();
        let ctx = RenderContext {
            servers: &servers,
            fallback_host: "panel.local",
            fallback_port: 8080,
        };
        let grants = vec![
            grant("alice", "eu-1", vec![PortValue::Num(80)]),
            grant("bob", "eu-1", vec![PortValue::Num(81)]),
        ];
        let out = render_all("{User}", &grants, &ctx).unwrap();
        assert_eq!(
            out,
            "### relayc_alice.ini ###\nalice\n\n### relayc_bob.ini ###\nbob\n"
        );
    }

    #[test]
    fn empty_selection_is_refused() {
        let servers = servers();
        let ctx = RenderContext {
            servers: &servers,
            fallback_host: "panel.local",
            fallback_port: 8080,
        };
        assert_eq!(render_all("{User}", &[], &ctx), Err(RenderError::NothingSelected));
    }
}

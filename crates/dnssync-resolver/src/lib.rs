// # Resolver Probes
//
// This crate provides the resolver-probe implementations for DNSSync:
// what does the world currently see when it resolves the target name?
//
// ## Implementations
//
// - [`SystemResolverProbe`]: native recursive lookups through the
//   system's configured nameservers. Production default.
// - [`LookupToolProbe`]: shells out to `nslookup` and parses its text
//   output. The section-marker / backward-scan parsing heuristic lives
//   here, in the adapter layer, and nowhere near the decision core.
//
// ## Failure semantics
//
// Both probes are degraded-read collaborators: NXDOMAIN, timeouts,
// missing tools, and unparseable output all collapse to `None`. The
// cause is logged here; the Reconciler only sees Unknown.

use std::net::Ipv4Addr;

use dnssync_core::traits::ResolverProbe;
use hickory_resolver::TokioAsyncResolver;
use tokio::process::Command;

/// Resolver probe using the system's recursive resolver configuration
pub struct SystemResolverProbe {
    resolver: TokioAsyncResolver,
}

impl SystemResolverProbe {
    /// Build a probe from the host resolver configuration
    /// (`/etc/resolv.conf` on Unix)
    pub fn from_system_conf() -> Result<Self, hickory_resolver::error::ResolveError> {
        Ok(Self {
            resolver: TokioAsyncResolver::tokio_from_system_conf()?,
        })
    }
}

#[async_trait::async_trait]
impl ResolverProbe for SystemResolverProbe {
    async fn resolve_published(&self, fqdn: &str) -> Option<Ipv4Addr> {
        // Trailing dot keeps search-domain expansion out of the lookup.
        let name = format!("{fqdn}.");
        match self.resolver.ipv4_lookup(name).await {
            Ok(lookup) => lookup.iter().next().map(|a| a.0),
            Err(e) => {
                tracing::warn!("recursive lookup for {fqdn} failed: {e}");
                None
            }
        }
    }
}

/// Resolver probe shelling out to an external lookup tool
///
/// Kept for hosts where in-process resolution is unavailable or
/// misconfigured; selectable via the `resolver: lookup-tool` config key.
pub struct LookupToolProbe {
    command: String,
}

impl LookupToolProbe {
    pub fn new() -> Self {
        Self {
            command: "nslookup".to_string(),
        }
    }

    /// Use a different lookup binary (tests point this at a stub)
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for LookupToolProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ResolverProbe for LookupToolProbe {
    async fn resolve_published(&self, fqdn: &str) -> Option<Ipv4Addr> {
        let output = match Command::new(&self.command).arg(fqdn).output().await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("failed to run {}: {e}", self.command);
                return None;
            }
        };

        if !output.status.success() {
            tracing::warn!(
                "{} {fqdn} exited with {}",
                self.command,
                output.status
            );
            return None;
        }

        let text = String::from_utf8_lossy(&output.stdout);
        parse_lookup_output(&text)
    }
}

/// Extract the answer address from lookup-tool text output
///
/// The tool prints its own resolver's address first, so a line starting
/// with `Address:` only counts once the `Name:` answer-section marker
/// has been seen. If no marked section is found, fall back to scanning
/// backward for the last address-bearing line.
fn parse_lookup_output(output: &str) -> Option<Ipv4Addr> {
    let mut in_answer = false;
    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("Name:") {
            in_answer = true;
        }
        if in_answer
            && let Some(rest) = trimmed.strip_prefix("Address:")
            && let Ok(ip) = rest.trim().parse()
        {
            return Some(ip);
        }
    }

    for line in output.lines().rev() {
        if let Some((_, rest)) = line.split_once("Address:") {
            let candidate = rest.trim();
            if candidate.contains('.')
                && let Ok(ip) = candidate.parse()
            {
                return Some(ip);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marked_answer_section_wins_over_server_address() {
        let output = "\
Server:\t\t10.0.0.1
Address:\t10.0.0.1#53

Non-authoritative answer:
Name:\thome.example.com
Address: 1.2.3.4
";
        assert_eq!(
            parse_lookup_output(output),
            Some("1.2.3.4".parse().unwrap())
        );
    }

    #[test]
    fn fallback_scans_backward_for_the_last_address_line() {
        // No Name: marker at all; the server line with a port suffix
        // does not parse, the plain answer line does.
        let output = "\
Server:  10.0.0.1
Address: 10.0.0.1#53

Address: 5.6.7.8
";
        assert_eq!(
            parse_lookup_output(output),
            Some("5.6.7.8".parse().unwrap())
        );
    }

    #[test]
    fn ipv6_answers_are_skipped_by_the_fallback() {
        let output = "\
Address: 2001:db8::1
Address: 5.6.7.8
Address: 2001:db8::2
";
        assert_eq!(
            parse_lookup_output(output),
            Some("5.6.7.8".parse().unwrap())
        );
    }

    #[test]
    fn nxdomain_output_yields_none() {
        let output = "\
Server:\t\t10.0.0.1
Address:\t10.0.0.1#53

** server can't find missing.example.com: NXDOMAIN
";
        assert_eq!(parse_lookup_output(output), None);
    }

    #[tokio::test]
    async fn missing_tool_is_a_degraded_read() {
        let probe = LookupToolProbe::with_command("definitely-not-a-real-lookup-tool");
        assert_eq!(probe.resolve_published("home.example.com").await, None);
    }
}

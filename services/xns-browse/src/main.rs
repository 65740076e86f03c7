//! Prints every registered name with its record and owner.
//!
//! Usage: `xns-browse [ADDRESS]`. With an address, names it owns are marked
//! with `*`. Reads `XNS_RPC_URL` and `XNS_CONTRACT_ADDRESS`.

use anyhow::{Context, bail};
use std::fmt::Write;
use tracing::info;
use xns_chain_evm::{DomainsContract, HttpTransport};
use xns_controller::ClientConfig;
use xns_controller::RegistrySnapshot;
use xns_controller::registry_view::fetch_all;
use xns_types::WalletAddress;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let viewer = std::env::args().nth(1).map(parse_address).transpose()?;
    let config = ClientConfig::from_env();
    let transport = HttpTransport::default();
    info!(
        "reading registry {} from {}",
        config.contract_address,
        transport.endpoint()
    );

    let contract = DomainsContract::new(
        transport,
        config.contract_address.clone(),
        config.receipt_poll_interval(),
    );
    let snapshot = fetch_all(&contract)
        .await
        .context("could not fetch the registry")?;

    print!("{}", render(&snapshot, &config, viewer.as_ref()));
    Ok(())
}

fn parse_address(raw: String) -> anyhow::Result<WalletAddress> {
    let digits = raw.strip_prefix("0x").unwrap_or_default();
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("not an address: {raw}");
    }
    Ok(WalletAddress(raw))
}

fn render(
    snapshot: &RegistrySnapshot,
    config: &ClientConfig,
    viewer: Option<&WalletAddress>,
) -> String {
    if snapshot.is_empty() {
        return "no names registered\n".to_owned();
    }

    let mut out = String::new();
    for record in snapshot.records() {
        let marker = match viewer {
            Some(viewer) if record.is_owned_by(viewer) => '*',
            _ => ' ',
        };
        let _ = writeln!(
            out,
            "{marker} {:<20} {:<32} {}  {}",
            record.full_name(&config.tld),
            record.record,
            record.owner.short(),
            config.marketplace_url(record),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use xns_types::DomainRecord;

    fn owner(n: u8) -> WalletAddress {
        WalletAddress(format!("0x{}{:02x}", "cd".repeat(19), n))
    }

    #[test]
    fn addresses_are_checked() {
        assert!(parse_address(owner(1).0).is_ok());
        assert!(parse_address("0x1234".to_owned()).is_err());
        assert!(parse_address(format!("1x{}", "a".repeat(40))).is_err());
    }

    #[test]
    fn owned_names_are_marked() {
        let config = ClientConfig::default();
        let snapshot = RegistrySnapshot::from(vec![
            DomainRecord {
                id: 0,
                name: "tiger".to_owned(),
                record: "claws".to_owned(),
                owner: owner(1),
            },
            DomainRecord {
                id: 1,
                name: "cat".to_owned(),
                record: "meow".to_owned(),
                owner: owner(2),
            },
        ]);

        let viewer = WalletAddress(owner(1).0.to_uppercase().replacen("0X", "0x", 1));
        let out = render(&snapshot, &config, Some(&viewer));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("* tiger.exe"));
        assert!(lines[1].starts_with("  cat.exe"));
        assert!(lines[1].ends_with("/1"));
    }

    #[test]
    fn empty_registry_says_so() {
        let out = render(&RegistrySnapshot::default(), &ClientConfig::default(), None);
        assert_eq!(out, "no names registered\n");
    }
}

//! Plain-text rendering of the view state

use std::fmt::Write;

use dnsview_core::{Dataset, HostRecordSet, Phase, ViewState};

const INDENT: &str = "  ";

/// Render one frame for the current view state
///
/// Loading shows only an indicator. Submitting keeps the held dataset on
/// screen below the progress line.
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();
    match state.phase {
        Phase::Loading => out.push_str("Loading DNS records...\n"),
        Phase::Error => {
            let message = state.error_message.as_deref().unwrap_or("Unknown error");
            let _ = writeln!(out, "Error: {}", message);
        }
        Phase::Submitting => {
            let domain = state.pending_domain.as_deref().unwrap_or_default();
            let _ = writeln!(out, "Resolving {}...", domain);
            if let Some(dataset) = &state.dataset {
                render_dataset(&mut out, dataset);
            }
        }
        Phase::Ready => match &state.dataset {
            Some(dataset) => render_dataset(&mut out, dataset),
            None => out.push_str("No data available\n"),
        },
    }
    out
}

fn render_dataset(out: &mut String, dataset: &Dataset) {
    if dataset.is_empty() {
        out.push_str("No data available\n");
        return;
    }
    for (name_server, hosts) in dataset.name_servers() {
        let _ = writeln!(out, "{}", name_server);
        render_hosts(out, hosts);
    }
}

fn render_hosts(out: &mut String, hosts: &HostRecordSet) {
    for (ip, group) in hosts.hosts() {
        let _ = writeln!(out, "{INDENT}{}", ip);
        if group.is_empty() {
            let _ = writeln!(out, "{INDENT}{INDENT}No records available");
            continue;
        }
        for (kind, values) in group.entries() {
            let _ = writeln!(out, "{INDENT}{INDENT}{}: {}", kind, values.join(", "));
        }
    }
}

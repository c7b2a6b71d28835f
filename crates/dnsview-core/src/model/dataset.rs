// # Dataset Model
//
// Typed shape of the records served by `GET /dns-records`:
//
// ```text
// Dataset        name server  -> HostRecordSet
// HostRecordSet  IP address   -> RecordGroup
// RecordGroup    record kind  -> [value, ...]
// ```
//
// Maps are kept sorted so renderers produce stable output. Value order
// inside a record kind is the order the service sent.
//
// Decoding goes through `Dataset::from_json`, which is the only place a
// body is turned into a dataset. Anything that is not an object of objects
// of objects of string arrays is rejected as `Error::Parse`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Well-known record kinds, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    /// Mail exchange record
    Mx,
    /// Text record
    Txt,
    /// Start of authority record
    Soa,
    /// Certification authority authorization record
    Caa,
}

impl RecordKind {
    /// All well-known kinds in display order
    pub const ALL: [RecordKind; 6] = [
        RecordKind::A,
        RecordKind::Aaaa,
        RecordKind::Mx,
        RecordKind::Txt,
        RecordKind::Soa,
        RecordKind::Caa,
    ];

    /// Wire label for this kind
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Mx => "MX",
            RecordKind::Txt => "TXT",
            RecordKind::Soa => "SOA",
            RecordKind::Caa => "CAA",
        }
    }

    /// Look up a well-known kind by its wire label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

/// Sort key putting well-known kinds first, then other labels alphabetically
fn display_rank(label: &str) -> (usize, &str) {
    let rank = RecordKind::from_label(label)
        .and_then(|kind| RecordKind::ALL.iter().position(|k| *k == kind))
        .unwrap_or(RecordKind::ALL.len());
    (rank, label)
}

/// Record values for one IP address, keyed by record-type label
///
/// A label is never present with an empty value list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordGroup(BTreeMap<String, Vec<String>>);

impl RecordGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, see [`RecordGroup::insert`]
    pub fn with(mut self, label: impl Into<String>, values: Vec<String>) -> Self {
        self.insert(label, values);
        self
    }

    /// Set the values for a label
    ///
    /// An empty value list removes the label instead.
    pub fn insert(&mut self, label: impl Into<String>, values: Vec<String>) {
        let label = label.into();
        if values.is_empty() {
            self.0.remove(&label);
        } else {
            self.0.insert(label, values);
        }
    }

    /// Values for a label, in source order
    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.0.get(label).map(Vec::as_slice)
    }

    /// Values for a well-known kind
    pub fn kind(&self, kind: RecordKind) -> Option<&[String]> {
        self.get(kind.label())
    }

    /// Labels and values in display order
    pub fn entries(&self) -> Vec<(&str, &[String])> {
        let mut entries: Vec<(&str, &[String])> = self
            .0
            .iter()
            .map(|(label, values)| (label.as_str(), values.as_slice()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| display_rank(a).cmp(&display_rank(b)));
        entries
    }

    /// Number of labels present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the group holds no records
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of values across all labels
    pub fn value_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl From<BTreeMap<String, Vec<String>>> for RecordGroup {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        let mut group = RecordGroup::new();
        for (label, values) in map {
            group.insert(label, values);
        }
        group
    }
}

impl<'de> Deserialize<'de> for RecordGroup {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, Vec<String>>::deserialize(deserializer).map(RecordGroup::from)
    }
}

/// Record groups for one name server, keyed by IP address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostRecordSet(BTreeMap<String, RecordGroup>);

impl HostRecordSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, ip: impl Into<String>, group: RecordGroup) -> Self {
        self.insert(ip, group);
        self
    }

    /// Set the record group for an IP address
    pub fn insert(&mut self, ip: impl Into<String>, group: RecordGroup) {
        self.0.insert(ip.into(), group);
    }

    /// Record group for an IP address
    pub fn get(&self, ip: &str) -> Option<&RecordGroup> {
        self.0.get(ip)
    }

    /// IP addresses and their groups, sorted by address string
    pub fn hosts(&self) -> impl Iterator<Item = (&str, &RecordGroup)> {
        self.0.iter().map(|(ip, group)| (ip.as_str(), group))
    }

    /// Number of IP addresses
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no IP addresses
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The full record dataset, keyed by name-server identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(BTreeMap<String, HostRecordSet>);

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a response body
    ///
    /// Surrounding whitespace is ignored. On failure the returned
    /// [`Error::Parse`] carries `body` exactly as given.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body.trim()).map_err(|e| {
            debug!("Dataset body rejected: {}", e);
            Error::parse(body)
        })
    }

    /// Encode as the JSON shape served by the records endpoint
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Other(format!("Failed to encode dataset: {}", e)))
    }

    /// Builder-style insert
    pub fn with(mut self, name_server: impl Into<String>, hosts: HostRecordSet) -> Self {
        self.insert(name_server, hosts);
        self
    }

    /// Set the hosts for a name server
    pub fn insert(&mut self, name_server: impl Into<String>, hosts: HostRecordSet) {
        self.0.insert(name_server.into(), hosts);
    }

    /// Hosts for a name server
    pub fn get(&self, name_server: &str) -> Option<&HostRecordSet> {
        self.0.get(name_server)
    }

    /// Name servers and their hosts, sorted by identifier
    pub fn name_servers(&self) -> impl Iterator<Item = (&str, &HostRecordSet)> {
        self.0.iter().map(|(ns, hosts)| (ns.as_str(), hosts))
    }

    /// Number of name servers
    pub fn name_server_count(&self) -> usize {
        self.0.len()
    }

    /// Number of IP addresses across all name servers
    pub fn host_count(&self) -> usize {
        self.0.values().map(HostRecordSet::len).sum()
    }

    /// Number of record values across the whole dataset
    pub fn value_count(&self) -> usize {
        self.0
            .values()
            .flat_map(HostRecordSet::hosts)
            .map(|(_, group)| group.value_count())
            .sum()
    }

    /// Whether there are no name servers
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_single_record() {
        let dataset =
            Dataset::from_json(r#"{"ns1.example.com": {"1.2.3.4": {"A": ["93.1.1.1"]}}}"#).unwrap();

        assert_eq!(dataset.name_server_count(), 1);
        assert_eq!(dataset.host_count(), 1);
        assert_eq!(dataset.value_count(), 1);

        let group = dataset.get("ns1.example.com").unwrap().get("1.2.3.4").unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group.kind(RecordKind::A), Some(&["93.1.1.1".to_string()][..]));
    }

    #[test]
    fn test_decode_trims_surrounding_whitespace() {
        let dataset = Dataset::from_json("\n  {\"ns\": {}}  \n").unwrap();
        assert_eq!(dataset.name_server_count(), 1);
        assert!(dataset.get("ns").unwrap().is_empty());
    }

    #[test]
    fn test_decode_preserves_value_order() {
        let dataset = Dataset::from_json(
            r#"{"ns": {"10.0.0.1": {"MX": ["20 mx2.example.com", "10 mx1.example.com"]}}}"#,
        )
        .unwrap();
        let group = dataset.get("ns").unwrap().get("10.0.0.1").unwrap();
        assert_eq!(
            group.get("MX").unwrap(),
            &values(&["20 mx2.example.com", "10 mx1.example.com"])[..]
        );
    }

    #[test]
    fn test_empty_group_is_allowed() {
        let dataset = Dataset::from_json(r#"{"ns": {"10.0.0.1": {}}}"#).unwrap();
        let group = dataset.get("ns").unwrap().get("10.0.0.1").unwrap();
        assert!(group.is_empty());
    }

    #[test]
    fn test_empty_value_list_is_pruned() {
        let dataset =
            Dataset::from_json(r#"{"ns": {"10.0.0.1": {"A": [], "TXT": ["v=spf1 -all"]}}}"#)
                .unwrap();
        let group = dataset.get("ns").unwrap().get("10.0.0.1").unwrap();
        assert_eq!(group.get("A"), None);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_malformed_shapes_are_parse_failures() {
        let bodies = [
            "",
            "not json",
            "[]",
            r#"{"ns": []}"#,
            r#"{"ns": {"1.2.3.4": []}}"#,
            r#"{"ns": {"1.2.3.4": {"A": "93.1.1.1"}}}"#,
            r#"{"ns": {"1.2.3.4": {"A": [1, 2]}}}"#,
            r#"{"ns": {"1.2.3.4": {"A": null}}}"#,
            r#"{"ns": null}"#,
        ];

        for body in bodies {
            match Dataset::from_json(body) {
                Err(Error::Parse { raw_body }) => assert_eq!(raw_body, body),
                other => panic!("expected parse failure for {:?}, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_parse_failure_keeps_untrimmed_body() {
        let err = Dataset::from_json("  oops \n").unwrap_err();
        assert_eq!(err, Error::parse("  oops \n"));
    }

    #[test]
    fn test_round_trip() {
        let dataset = Dataset::new()
            .with(
                "a.root-servers.net",
                HostRecordSet::new()
                    .with(
                        "198.41.0.4",
                        RecordGroup::new()
                            .with("A", values(&["93.184.216.34"]))
                            .with("AAAA", values(&["2606:2800:220:1:248:1893:25c8:1946"]))
                            .with("TXT", values(&["v=spf1 -all", "google-site-verification=x"])),
                    )
                    .with("199.9.14.201", RecordGroup::new()),
            )
            .with(
                "ns1.example.com",
                HostRecordSet::new().with(
                    "1.2.3.4",
                    RecordGroup::new()
                        .with("SOA", values(&["ns1.example.com. admin.example.com. 1 2 3 4 5"]))
                        .with("HINFO", values(&["custom"])),
                ),
            )
            .with("ns2.example.com", HostRecordSet::new());

        let encoded = dataset.to_json().unwrap();
        assert_eq!(Dataset::from_json(&encoded).unwrap(), dataset);
    }

    #[test]
    fn test_entries_display_order() {
        let group = RecordGroup::new()
            .with("ZZZ", values(&["z"]))
            .with("CAA", values(&["0 issue \"letsencrypt.org\""]))
            .with("A", values(&["1.1.1.1"]))
            .with("HINFO", values(&["h"]))
            .with("MX", values(&["10 mx"]));

        let labels: Vec<&str> = group.entries().into_iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["A", "MX", "CAA", "HINFO", "ZZZ"]);
    }

    #[test]
    fn test_insert_empty_removes_label() {
        let mut group = RecordGroup::new().with("A", values(&["1.1.1.1"]));
        group.insert("A", Vec::new());
        assert!(group.is_empty());
    }

    #[test]
    fn test_record_kind_labels() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(RecordKind::from_label("a"), None);
        assert_eq!(RecordKind::from_label("NS"), None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn label() -> impl Strategy<Value = String> {
            prop_oneof![
                prop::sample::select(RecordKind::ALL.to_vec())
                    .prop_map(|kind| kind.label().to_string()),
                Just("HINFO".to_string()),
                any::<String>(),
            ]
        }

        fn value() -> impl Strategy<Value = String> {
            prop_oneof![
                any::<String>(),
                Just("0 issue \"letsencrypt.org\"".to_string()),
                Just("v=spf1 \\ -all\n\tüñï €".to_string()),
            ]
        }

        fn group() -> impl Strategy<Value = RecordGroup> {
            prop::collection::btree_map(label(), prop::collection::vec(value(), 0..4), 0..5)
                .prop_map(RecordGroup::from)
        }

        fn hosts() -> impl Strategy<Value = HostRecordSet> {
            prop::collection::vec((any::<String>(), group()), 0..4).prop_map(|entries| {
                entries
                    .into_iter()
                    .fold(HostRecordSet::new(), |hosts, (ip, group)| hosts.with(ip, group))
            })
        }

        fn dataset() -> impl Strategy<Value = Dataset> {
            prop::collection::vec((any::<String>(), hosts()), 0..4).prop_map(|entries| {
                entries
                    .into_iter()
                    .fold(Dataset::new(), |dataset, (ns, hosts)| dataset.with(ns, hosts))
            })
        }

        proptest! {
            #[test]
            fn prop_encode_then_decode_is_identity(dataset in dataset()) {
                let encoded = dataset.to_json().unwrap();
                prop_assert_eq!(Dataset::from_json(&encoded).unwrap(), dataset);
            }

            #[test]
            fn prop_decoded_groups_never_hold_empty_lists(dataset in dataset()) {
                let decoded = Dataset::from_json(&dataset.to_json().unwrap()).unwrap();
                for (_, hosts) in decoded.name_servers() {
                    for (_, group) in hosts.hosts() {
                        prop_assert!(group.entries().iter().all(|(_, values)| !values.is_empty()));
                    }
                }
            }
        }
    }
}

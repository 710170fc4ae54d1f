//! Mediator kinds, their shape classes and tag normalization.

use std::fmt;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How a mediator nests other mediators. Position resolution is written once per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeClass {
    /// No nested sequences.
    Leaf,
    /// `then` / `else`.
    BinaryBranch,
    /// A fixed set of named branches (onAccept, onReject, ...).
    NamedMultiBranch,
    /// One default branch followed by an ordered list of cases.
    IndexedMultiBranch,
    /// One or more wrapped target sequences.
    SingleWrappedBranch,
}

/// Every mediator the flow tree knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediatorKind {
    // Leaf mediators
    Log,
    Property,
    PropertyGroup,
    Variable,
    SequenceRef,
    Call,
    CallTemplate,
    Send,
    Respond,
    Drop,
    Loopback,
    Store,
    Header,
    PayloadFactory,
    Enrich,
    Script,
    Class,
    Bean,
    Ejb,
    Xslt,
    FastXslt,
    Xquery,
    DataMapper,
    DataServiceCall,
    DbLookup,
    DbReport,
    Event,
    Transaction,
    Enqueue,
    Builder,
    Smooks,
    Cache,
    Spring,
    Connector,
    Unknown,

    // Branching mediators
    Filter,
    Switch,
    Throttle,
    Entitlement,
    Validate,
    Rule,
    Clone,
    Iterate,
    Foreach,
    Aggregate,
}

/// Canonical spellings. Alternate spellings are folded by [`normalize_tag`] before lookup.
static TAG_TABLE: Lazy<FxHashMap<&'static str, MediatorKind>> = Lazy::new(|| {
    use MediatorKind::*;
    let entries: &[(&str, MediatorKind)] = &[
        ("log", Log),
        ("property", Property),
        ("propertygroup", PropertyGroup),
        ("variable", Variable),
        ("sequence", SequenceRef),
        ("call", Call),
        ("calltemplate", CallTemplate),
        ("send", Send),
        ("respond", Respond),
        ("drop", Drop),
        ("loopback", Loopback),
        ("store", Store),
        ("header", Header),
        ("payloadfactory", PayloadFactory),
        ("enrich", Enrich),
        ("script", Script),
        ("class", Class),
        ("bean", Bean),
        ("ejb", Ejb),
        ("xslt", Xslt),
        ("fastxslt", FastXslt),
        ("xquery", Xquery),
        ("datamapper", DataMapper),
        ("dataservicecall", DataServiceCall),
        ("dblookup", DbLookup),
        ("dbreport", DbReport),
        ("event", Event),
        ("transaction", Transaction),
        ("enqueue", Enqueue),
        ("builder", Builder),
        ("smooks", Smooks),
        ("cache", Cache),
        ("spring", Spring),
        ("filter", Filter),
        ("switch", Switch),
        ("throttle", Throttle),
        ("entitlementservice", Entitlement),
        ("validate", Validate),
        ("rule", Rule),
        ("clone", Clone),
        ("iterate", Iterate),
        ("foreach", Foreach),
        ("aggregate", Aggregate),
    ];
    entries.iter().copied().collect()
});

/// Folds a tag spelling into the key used by [`TAG_TABLE`]:
/// lower case, hyphens and underscores dropped (`call-template`, `callTemplate` -> `calltemplate`).
pub fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl MediatorKind {
    /// Maps a document tag to its kind.
    ///
    /// Namespaced tags (`ns:operation`) and dotted connector operations
    /// (`gmail.send`) always map to [`MediatorKind::Connector`]. Anything else that is
    /// not in the table is [`MediatorKind::Unknown`].
    pub fn from_tag(tag: &str) -> MediatorKind {
        if tag.contains(':') || tag.contains('.') {
            return MediatorKind::Connector;
        }
        TAG_TABLE
            .get(normalize_tag(tag).as_str())
            .copied()
            .unwrap_or(MediatorKind::Unknown)
    }

    pub fn shape_class(self) -> ShapeClass {
        use MediatorKind::*;
        match self {
            Filter => ShapeClass::BinaryBranch,
            Throttle | Entitlement => ShapeClass::NamedMultiBranch,
            Switch => ShapeClass::IndexedMultiBranch,
            Validate | Rule | Clone | Iterate | Foreach | Aggregate => {
                ShapeClass::SingleWrappedBranch
            }
            _ => ShapeClass::Leaf,
        }
    }

    /// Mediators after which the message flow does not continue in the same sequence.
    pub fn terminates_flow(self) -> bool {
        matches!(self, MediatorKind::Respond | MediatorKind::Drop | MediatorKind::Loopback)
    }

    /// Human readable name used in debugger error messages.
    pub fn display_name(self) -> &'static str {
        use MediatorKind::*;
        match self {
            Log => "Log Mediator",
            Property => "Property Mediator",
            PropertyGroup => "Property Group Mediator",
            Variable => "Variable Mediator",
            SequenceRef => "Sequence Mediator",
            Call => "Call Mediator",
            CallTemplate => "Call Template Mediator",
            Send => "Send Mediator",
            Respond => "Respond Mediator",
            Drop => "Drop Mediator",
            Loopback => "Loopback Mediator",
            Store => "Store Mediator",
            Header => "Header Mediator",
            PayloadFactory => "Payload Factory Mediator",
            Enrich => "Enrich Mediator",
            Script => "Script Mediator",
            Class => "Class Mediator",
            Bean => "Bean Mediator",
            Ejb => "EJB Mediator",
            Xslt => "XSLT Mediator",
            FastXslt => "Fast XSLT Mediator",
            Xquery => "XQuery Mediator",
            DataMapper => "Data Mapper Mediator",
            DataServiceCall => "Data Service Call Mediator",
            DbLookup => "DB Lookup Mediator",
            DbReport => "DB Report Mediator",
            Event => "Event Mediator",
            Transaction => "Transaction Mediator",
            Enqueue => "Enqueue Mediator",
            Builder => "Builder Mediator",
            Smooks => "Smooks Mediator",
            Cache => "Cache Mediator",
            Spring => "Spring Mediator",
            Connector => "Connector",
            Unknown => "Unknown Mediator",
            Filter => "Filter Mediator",
            Switch => "Switch Mediator",
            Throttle => "Throttle Mediator",
            Entitlement => "Entitlement Mediator",
            Validate => "Validate Mediator",
            Rule => "Rule Mediator",
            Clone => "Clone Mediator",
            Iterate => "Iterate Mediator",
            Foreach => "Foreach Mediator",
            Aggregate => "Aggregate Mediator",
        }
    }
}

impl fmt::Display for MediatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spellings_collapse_to_one_kind() {
        assert_eq!(MediatorKind::from_tag("payloadFactory"), MediatorKind::PayloadFactory);
        assert_eq!(MediatorKind::from_tag("payload-factory"), MediatorKind::PayloadFactory);
        assert_eq!(MediatorKind::from_tag("call-template"), MediatorKind::CallTemplate);
        assert_eq!(MediatorKind::from_tag("callTemplate"), MediatorKind::CallTemplate);
        assert_eq!(MediatorKind::from_tag("entitlementService"), MediatorKind::Entitlement);
        assert_eq!(MediatorKind::from_tag("dblookup"), MediatorKind::DbLookup);
    }

    #[test]
    fn test_namespaced_tags_are_connectors() {
        assert_eq!(MediatorKind::from_tag("gmail.send"), MediatorKind::Connector);
        assert_eq!(MediatorKind::from_tag("sf:query"), MediatorKind::Connector);
        assert_eq!(MediatorKind::from_tag("http.post"), MediatorKind::Connector);
    }

    #[test]
    fn test_unmapped_tag_is_unknown() {
        assert_eq!(MediatorKind::from_tag("teleport"), MediatorKind::Unknown);
        assert_eq!(MediatorKind::Unknown.shape_class(), ShapeClass::Leaf);
    }

    #[test]
    fn test_shape_classes() {
        assert_eq!(MediatorKind::Filter.shape_class(), ShapeClass::BinaryBranch);
        assert_eq!(MediatorKind::Switch.shape_class(), ShapeClass::IndexedMultiBranch);
        assert_eq!(MediatorKind::Throttle.shape_class(), ShapeClass::NamedMultiBranch);
        assert_eq!(MediatorKind::Entitlement.shape_class(), ShapeClass::NamedMultiBranch);
        assert_eq!(MediatorKind::Clone.shape_class(), ShapeClass::SingleWrappedBranch);
        assert_eq!(MediatorKind::Log.shape_class(), ShapeClass::Leaf);
    }
}

use revfeed_core::model::{FieldValue, LinkRole, Revision, Snapshot};
use revfeed_core::upstream::ContainerPath;
use revfeed_core::window::RevisionWindow;

/// The `Requirements` document used across fixtures
#[allow(dead_code)]
pub fn requirements_doc() -> ContainerPath {
    ContainerPath::new("elibrary", "Specs", "Requirements")
}

#[allow(dead_code)]
pub fn blocks() -> LinkRole {
    LinkRole::new("blocks", "blocks", "is blocked by")
}

#[allow(dead_code)]
pub fn relates_to() -> LinkRole {
    LinkRole::new("relates_to", "relates to", "is related to")
}

#[allow(dead_code)]
pub fn window(baseline: u64, end: u64) -> RevisionWindow {
    RevisionWindow::new(Revision::new(baseline), Revision::new(end)).unwrap()
}

/// History whose only varying field is `title`, one snapshot per revision
#[allow(dead_code)]
pub fn title_history(item_id: &str, steps: &[(u64, &str)]) -> Vec<Snapshot> {
    steps
        .iter()
        .map(|(revision, title)| {
            Snapshot::new(item_id, *revision)
                .with_type("requirement")
                .with_field("title", FieldValue::text(*title))
        })
        .collect()
}

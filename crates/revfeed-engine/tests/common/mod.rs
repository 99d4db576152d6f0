use revfeed_core::model::{FieldValue, LinkRole, Revision, Snapshot};
use revfeed_core::upstream::{ContainerPath, InMemoryUpstream, InMemoryUpstreamBuilder};
use revfeed_engine::FeedRequest;

#[allow(dead_code)]
pub fn doc() -> ContainerPath {
    ContainerPath::new("elibrary", "Specs", "Requirements")
}

#[allow(dead_code)]
pub fn other_doc() -> ContainerPath {
    ContainerPath::new("elibrary", "Specs", "Archive")
}

#[allow(dead_code)]
pub fn blocks() -> LinkRole {
    LinkRole::new("blocks", "blocks", "is blocked by")
}

#[allow(dead_code)]
pub fn requirement(id: &str, revision: u64, title: &str) -> Snapshot {
    Snapshot::new(id, revision)
        .with_type("requirement")
        .with_field("title", FieldValue::text(title))
}

/// WI-1 created at 1, retitled at 5, linked to WI-X ("blocks") at 9.
/// WI-X created at 2 and untouched since.
#[allow(dead_code)]
pub fn blocks_scenario() -> InMemoryUpstreamBuilder {
    InMemoryUpstream::builder()
        .link_role(blocks())
        .item(
            &doc(),
            vec![
                requirement("WI-1", 1, "A"),
                requirement("WI-1", 5, "B"),
                requirement("WI-1", 9, "B").with_link("WI-X", &blocks()),
            ],
        )
        .item(&doc(), vec![requirement("WI-X", 2, "Target")])
}

/// `count` items WI-01.. each changed once inside the window
#[allow(dead_code)]
pub fn many_items(count: usize) -> InMemoryUpstream {
    let mut builder = InMemoryUpstream::builder();
    for n in 1..=count {
        let id = format!("WI-{:02}", n);
        builder = builder.item(
            &doc(),
            vec![
                requirement(&id, 1, "draft"),
                requirement(&id, 10 + n as u64, "final"),
            ],
        );
    }
    builder.build()
}

#[allow(dead_code)]
pub fn request(baseline: u64, end: u64) -> FeedRequest {
    FeedRequest::new(doc(), Revision::new(baseline)).with_end_revision(Revision::new(end))
}

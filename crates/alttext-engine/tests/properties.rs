//! End-to-end behaviour of the workbench against in-process collaborators.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use alttext_core::canvas::{CanvasNode, ImageAttachment};
use alttext_core::ids::NodeId;
use alttext_core::item::{ImageItem, ItemStatus};
use alttext_engine::messages::NO_IMAGE_SOURCE;
use alttext_engine::{
    ApplyOutcome, Discovery, GenerateOutcome, GenerationConfig, MemoryCanvas, Workbench,
};
use alttext_llm::{MockGenerator, MockResponse};

fn image_node(id: &str, alt: &str) -> CanvasNode {
    CanvasNode::new(id).with_image(
        ImageAttachment::new(format!("https://img/{id}.png")).with_alt_text(alt),
    )
}

fn workbench(canvas: &Arc<MemoryCanvas>, generator: &Arc<MockGenerator>) -> Workbench {
    Workbench::new(
        Arc::clone(canvas) as _,
        Arc::clone(generator) as _,
        GenerationConfig::default(),
    )
}

fn pairs(items: &[ImageItem]) -> HashSet<(String, String)> {
    items
        .iter()
        .map(|i| (i.id.to_string(), i.committed_text.clone()))
        .collect()
}

#[tokio::test]
async fn rescan_of_unchanged_canvas_is_idempotent() {
    let canvas = Arc::new(MemoryCanvas::with_nodes([
        image_node("1", "a cat"),
        image_node("2", ""),
        image_node("3", "a boat"),
    ]));
    let wb = workbench(&canvas, &Arc::new(MockGenerator::new()));

    let first = wb.scan().await;
    let second = wb.scan().await;

    assert_ne!(first.scan_id, second.scan_id);
    assert_eq!(pairs(&first.items), pairs(&second.items));
    assert_eq!(pairs(&second.items).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn generating_one_item_leaves_another_untouched() {
    let canvas = Arc::new(MemoryCanvas::with_nodes([image_node("a", ""), image_node("b", "")]));
    let generator = Arc::new(
        MockGenerator::new()
            .with_response("https://img/a.png", MockResponse::text("alpha"))
            .with_response(
                "https://img/b.png",
                MockResponse::delayed(Duration::from_millis(100), MockResponse::text("beta")),
            ),
    );
    let wb = workbench(&canvas, &generator);
    wb.scan().await;
    let (a, b) = (NodeId::from_raw("a"), NodeId::from_raw("b"));

    let (b_outcome, b_during) = tokio::join!(wb.generate(&b), async {
        tokio::task::yield_now().await;
        let before = wb.registry().get(&b).unwrap();
        assert_eq!(before.status, ItemStatus::Generating);

        wb.generate(&a).await.unwrap();

        let after = wb.registry().get(&b).unwrap();
        assert_eq!(before, after);
        after
    });

    assert!(b_during.draft_text.is_none());
    assert_eq!(
        b_outcome.unwrap(),
        GenerateOutcome::Drafted { text: "beta".into(), degraded: false }
    );
    assert_eq!(wb.item(&a).unwrap().draft_text.as_deref(), Some("alpha"));
}

#[tokio::test]
async fn item_without_source_never_reaches_generator() {
    let canvas = Arc::new(MemoryCanvas::new());
    let generator = Arc::new(MockGenerator::always(MockResponse::text("unused")));
    let wb = workbench(&canvas, &generator);
    let id = NodeId::from_raw("blank");
    wb.registry().replace_all(vec![ImageItem::new(id.clone(), "")]);

    for _ in 0..2 {
        assert_eq!(wb.generate(&id).await.unwrap(), GenerateOutcome::NoSource);
        let item = wb.registry().get(&id).unwrap();
        assert_eq!(item.last_error(), Some(NO_IMAGE_SOURCE));
    }
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn apply_changes_only_alt_text() {
    let canvas = Arc::new(MemoryCanvas::with_nodes([CanvasNode::new("n").with_image(
        ImageAttachment::new("x").with_property("crop", "c"),
    )]));
    let wb = workbench(&canvas, &Arc::new(MockGenerator::new()));
    wb.scan().await;
    let id = NodeId::from_raw("n");
    wb.edit_draft(&id, "a tree").unwrap();

    wb.apply(&id).await.unwrap();

    let mutations = canvas.mutations();
    assert_eq!(mutations.len(), 1);
    let sent = mutations[0].1.image_attachment.clone().unwrap();
    assert_eq!(
        sent,
        ImageAttachment::new("x")
            .with_property("crop", "c")
            .with_alt_text("a tree")
    );
}

#[tokio::test]
async fn selection_fallback_yields_single_item() {
    let canvas = Arc::new(MemoryCanvas::with_nodes([image_node("sel", "")]));
    canvas.set_enumerable(false);
    canvas.select(Some(NodeId::from_raw("sel")));
    let wb = workbench(&canvas, &Arc::new(MockGenerator::new()));

    let outcome = wb.scan().await;

    assert_eq!(outcome.discovery, Discovery::Selection);
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(wb.items()[0].id, NodeId::from_raw("sel"));
}

#[tokio::test(start_paused = true)]
async fn completion_after_rescan_is_discarded() {
    let canvas = Arc::new(MemoryCanvas::with_nodes([image_node("42", ""), image_node("7", "")]));
    let generator = Arc::new(MockGenerator::new().with_response(
        "https://img/42.png",
        MockResponse::delayed(Duration::from_millis(50), MockResponse::text("late")),
    ));
    let wb = workbench(&canvas, &generator);
    wb.scan().await;
    let id = NodeId::from_raw("42");

    let (outcome, after_rescan) = tokio::join!(wb.generate(&id), async {
        tokio::task::yield_now().await;
        canvas.remove(&id);
        wb.scan().await;
        wb.registry().snapshot()
    });

    assert_eq!(outcome.unwrap(), GenerateOutcome::Stale);
    assert_eq!(wb.registry().snapshot(), after_rescan);
    assert!(wb.item(&id).is_none());
}

#[tokio::test]
async fn apply_without_draft_recommits_existing_text() {
    let canvas = Arc::new(MemoryCanvas::with_nodes([image_node("c", "cat")]));
    let wb = workbench(&canvas, &Arc::new(MockGenerator::new()));
    wb.scan().await;
    let id = NodeId::from_raw("c");

    let outcome = wb.apply(&id).await.unwrap();

    assert_eq!(outcome, ApplyOutcome::Committed { text: "cat".into() });
    let mutations = canvas.mutations();
    let (_, patch) = &mutations[0];
    let sent = patch.image_attachment.as_ref().unwrap();
    assert_eq!(sent.alt_text.as_deref(), Some("cat"));
    assert_eq!(wb.item(&id).unwrap().committed_text, "cat");
}

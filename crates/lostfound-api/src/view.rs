use lostfound_db::Snapshot;
use lostfound_types::api::MessageView;
use lostfound_types::models::Viewer;

/// Annotate a snapshot for one viewer, preserving message order.
///
/// The snapshot already carries counts and the viewer's likes from the
/// transaction that read the messages, so no record can mix two states.
pub fn assemble(snapshot: Snapshot, viewer: &Viewer) -> Vec<MessageView> {
    let Snapshot {
        messages,
        counts,
        liked,
    } = snapshot;

    messages
        .into_iter()
        .map(|m| {
            let c = counts.get(&m.id).copied().unwrap_or_default();
            MessageView {
                is_owner: viewer.user_id == Some(m.author_id),
                liked_by_viewer: liked.contains(&m.id),
                like_count: c.likes,
                reply_count: m.is_root().then_some(c.replies),
                id: m.id,
                author_id: m.author_id,
                content: m.content,
                parent_id: m.parent_id,
                created_at: m.created_at,
            }
        })
        .collect()
}

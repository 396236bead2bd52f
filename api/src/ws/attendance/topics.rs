use uuid::Uuid;

/// Broadcast topic for one session's attendance stream.
pub fn session_topic(session_id: Uuid) -> String {
    format!("attendance:session:{session_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_embeds_the_session_id() {
        let id = Uuid::new_v4();
        assert_eq!(session_topic(id), format!("attendance:session:{id}"));
    }
}

//! Integration tests for the interactive chat loop against a mock
//! model server

mod test_utils;

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use lmchat::chat::{SessionBuilder, SessionError};
    use lmchat::cli::chat::converse;
    use lmchat::openai::{CompletionError, GenerationParams, Message, Role};

    use crate::test_utils::{ScriptedInput, chat_request_body, completion_body, test_client};

    #[tokio::test]
    async fn it_strips_sentinel_and_records_three_turns() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer EMPTY")
            .match_body(Matcher::PartialJson(json!({
                "model": "mistral",
                "max_tokens": 256,
                "frequency_penalty": 1.0,
                "top_p": 0.1,
                "temperature": 0.1,
                "messages": [
                    {"role": "system", "content": "You are terse."},
                    {"role": "user", "content": "Hi"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("Hello</s>"))
            .create_async()
            .await;

        let mut session =
            SessionBuilder::new(GenerationParams::chat("mistral")).build(test_client(&server));
        let mut input = ScriptedInput::new(&["You are terse.", "Hi"]);
        let mut out = Vec::new();

        converse(&mut session, &mut input, &mut out).await.unwrap();

        mock.assert_async().await;
        assert_eq!(String::from_utf8(out).unwrap(), "Hello\n");
        assert_eq!(
            session.transcript().messages(),
            vec![
                Message::new(Role::System, "You are terse."),
                Message::new(Role::User, "Hi"),
                Message::new(Role::Assistant, "Hello"),
            ]
        );
        assert_eq!(
            input.prompts,
            vec!["Enter system prompt >>> ", ">>> ", ">>> "]
        );
    }

    #[tokio::test]
    async fn it_marks_truncated_output() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::Json(chat_request_body(json!([
                {"role": "user", "content": "2+2?"}
            ]))))
            .with_status(200)
            .with_body(completion_body("4"))
            .create_async()
            .await;

        let mut session =
            SessionBuilder::new(GenerationParams::chat("mistral")).build(test_client(&server));
        let mut input = ScriptedInput::new(&["", "2+2?"]);
        let mut out = Vec::new();

        converse(&mut session, &mut input, &mut out).await.unwrap();

        mock.assert_async().await;
        assert_eq!(String::from_utf8(out).unwrap(), "4...\n");
        assert_eq!(session.transcript().len(), 2);
        assert!(!session.transcript().has_system());
    }

    #[tokio::test]
    async fn it_sends_normalized_history_on_next_turn() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::Json(chat_request_body(json!([
                {"role": "user", "content": "Hi"}
            ]))))
            .with_status(200)
            .with_body(completion_body("Hello<eos>"))
            .create_async()
            .await;
        let second = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::Json(chat_request_body(json!([
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello"},
                {"role": "user", "content": "Again"}
            ]))))
            .with_status(200)
            .with_body(completion_body("Hello again"))
            .create_async()
            .await;

        let mut session =
            SessionBuilder::new(GenerationParams::chat("mistral")).build(test_client(&server));
        let mut input = ScriptedInput::new(&["", "Hi", "Again"]);
        let mut out = Vec::new();

        converse(&mut session, &mut input, &mut out).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(String::from_utf8(out).unwrap(), "Hello\nHello again...\n");
        assert_eq!(
            session.transcript().last(),
            Some(&Message::new(Role::Assistant, "Hello again"))
        );
    }

    #[tokio::test]
    async fn it_stops_on_server_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body("loading model")
            .expect(1)
            .create_async()
            .await;

        let mut session =
            SessionBuilder::new(GenerationParams::chat("mistral")).build(test_client(&server));
        let mut input = ScriptedInput::new(&["", "Hi", "never sent"]);
        let mut out = Vec::new();

        let err = converse(&mut session, &mut input, &mut out)
            .await
            .unwrap_err();

        mock.assert_async().await;
        match err.downcast_ref::<SessionError>() {
            Some(SessionError::Completion(CompletionError::Status { status, .. })) => {
                assert_eq!(*status, 503)
            }
            other => panic!("Expected status error, got {:?}", other),
        }
        assert!(out.is_empty());
        assert_eq!(
            session.transcript().messages(),
            vec![Message::new(Role::User, "Hi")]
        );
    }

    #[tokio::test]
    async fn it_ends_quietly_without_input() {
        let server = mockito::Server::new_async().await;
        let mut session =
            SessionBuilder::new(GenerationParams::chat("mistral")).build(test_client(&server));
        let mut input = ScriptedInput::new(&[]);
        let mut out = Vec::new();

        converse(&mut session, &mut input, &mut out).await.unwrap();

        assert!(out.is_empty());
        assert!(session.transcript().is_empty());
        assert_eq!(input.prompts, vec!["Enter system prompt >>> "]);
    }
}

//! Text-to-speech generation.
//!
//! This module validates generation input, submits jobs and follows them
//! with a cancellable polling task until they complete, fail or are
//! cancelled.

mod controller;
mod request;

pub use controller::{
    CancelHandle, DEFAULT_POLL_INTERVAL, GenerationController, GenerationError, GenerationEvent,
    GenerationOutcome, GenerationState,
};
pub use request::{
    DEFAULT_LANGUAGE, LANGUAGES, MAX_TEXT_LENGTH, ValidationError, can_generate, credits_needed,
    validate_request,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, GenerationJob, JobStatus, MockApi, User};
    use mockall::Sequence;
    use mockall::predicate::eq;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    const TICK: Duration = Duration::from_millis(10);

    fn job(status: JobStatus) -> GenerationJob {
        GenerationJob {
            id: "job-1".to_string(),
            status,
            audio_url: None,
            error: None,
        }
    }

    fn expect_submit(mock: &mut MockApi) {
        mock.expect_submit()
            .times(1)
            .returning(|_| Ok(job(JobStatus::Pending)));
    }

    // ===========================================
    // Request validation tests
    // ===========================================

    #[test]
    fn test_validate_request_trims_text() {
        let request = validate_request("  Hello there  ", Some("v1"), Some("fr")).unwrap();

        assert_eq!(request.text, "Hello there");
        assert_eq!(request.voice_id, "v1");
        assert_eq!(request.language, "fr");
    }

    #[test]
    fn test_validate_request_defaults_language() {
        let request = validate_request("Hello", Some("v1"), None).unwrap();
        assert_eq!(request.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_validate_request_empty_text() {
        assert_eq!(
            validate_request("   ", Some("v1"), None).unwrap_err(),
            ValidationError::EmptyText
        );
    }

    #[test]
    fn test_validate_request_missing_voice() {
        assert_eq!(
            validate_request("Hello", None, None).unwrap_err(),
            ValidationError::NoVoiceSelected
        );
        assert_eq!(
            validate_request("Hello", Some(" "), None).unwrap_err(),
            ValidationError::NoVoiceSelected
        );
    }

    #[test]
    fn test_validate_request_too_long() {
        let text = "a".repeat(MAX_TEXT_LENGTH + 1);
        assert!(matches!(
            validate_request(&text, Some("v1"), None),
            Err(ValidationError::TextTooLong(_))
        ));
    }

    #[test]
    fn test_validate_request_unknown_language() {
        assert!(matches!(
            validate_request("Hello", Some("v1"), Some("xx")),
            Err(ValidationError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_credits_needed_rounds_up() {
        assert_eq!(credits_needed(""), 0);
        assert_eq!(credits_needed("a"), 1);
        assert_eq!(credits_needed(&"a".repeat(100)), 1);
        assert_eq!(credits_needed(&"a".repeat(101)), 2);
    }

    #[test]
    fn test_can_generate_requires_remaining_credits() {
        let mut user = User {
            credits: 10,
            used_credits: 10,
            ..Default::default()
        };
        assert!(!can_generate(Some(&user)));

        user.used_credits = 9;
        assert!(can_generate(Some(&user)));
        assert!(!can_generate(None));
    }

    // ===========================================
    // GenerationController tests
    // ===========================================

    #[test]
    fn test_invalid_input_never_calls_api() {
        // No expectations: any API call would panic.
        let mock = MockApi::new();
        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);

        let empty = controller.generate("", Some("v1"), None);
        assert!(matches!(
            empty,
            Err(GenerationError::Validation(ValidationError::EmptyText))
        ));

        let no_voice = controller.generate("Hello", None, None);
        assert!(matches!(
            no_voice,
            Err(GenerationError::Validation(ValidationError::NoVoiceSelected))
        ));
        assert_eq!(controller.state(), GenerationState::Idle);
    }

    #[test]
    fn test_submit_failure_leaves_controller_idle() {
        let mut mock = MockApi::new();
        mock.expect_submit().times(1).returning(|_| {
            Err(ApiError::Server {
                status: 402,
                message: "Not enough credits".to_string(),
            })
        });

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        let err = controller.generate("Hello", Some("v1"), None).unwrap_err();

        assert_eq!(err.to_string(), "Not enough credits");
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_polls_until_completed_then_stops() {
        let mut mock = MockApi::new();
        let mut seq = Sequence::new();
        expect_submit(&mut mock);
        mock.expect_status()
            .with(eq("job-1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(job(JobStatus::Processing)));
        mock.expect_status()
            .with(eq("job-1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(GenerationJob {
                    audio_url: Some("/media/job-1.mp3".to_string()),
                    ..job(JobStatus::Completed)
                })
            });

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("Hello", Some("v1"), None).unwrap();
        assert_eq!(
            controller.state(),
            GenerationState::Polling {
                job_id: "job-1".to_string()
            }
        );

        let mut events = Vec::new();
        let outcome = controller.wait(None, |e| events.push(e.clone())).unwrap();

        match outcome {
            GenerationOutcome::Completed(job) => {
                assert_eq!(job.audio_url.as_deref(), Some("/media/job-1.mp3"))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GenerationEvent::Status(_)));
        assert_eq!(controller.state(), GenerationState::Idle);

        // Several more ticks pass; the mock rejects any further status call.
        thread::sleep(TICK * 5);
    }

    #[test]
    fn test_failed_job_surfaces_server_message() {
        let mut mock = MockApi::new();
        expect_submit(&mut mock);
        mock.expect_status().times(1).returning(|_| {
            Ok(GenerationJob {
                error: Some("Voice model unavailable".to_string()),
                ..job(JobStatus::Failed)
            })
        });

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("Hello", Some("v1"), None).unwrap();

        let outcome = controller.wait(None, |_| {}).unwrap();
        assert_eq!(
            outcome,
            GenerationOutcome::Failed("Voice model unavailable".to_string())
        );
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_failed_job_without_message_uses_generic_text() {
        let mut mock = MockApi::new();
        expect_submit(&mut mock);
        mock.expect_status()
            .times(1)
            .returning(|_| Ok(job(JobStatus::Failed)));

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("Hello", Some("v1"), None).unwrap();

        let outcome = controller.wait(None, |_| {}).unwrap();
        assert_eq!(outcome, GenerationOutcome::Failed("Generation failed".to_string()));
    }

    #[test]
    fn test_status_error_keeps_polling() {
        let mut mock = MockApi::new();
        let mut seq = Sequence::new();
        expect_submit(&mut mock);
        mock.expect_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ApiError::ConnectionFailed("reset".to_string())));
        mock.expect_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(job(JobStatus::Completed)));

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("Hello", Some("v1"), None).unwrap();

        let outcome = controller.wait(None, |_| {}).unwrap();
        assert!(matches!(outcome, GenerationOutcome::Completed(_)));
    }

    #[test]
    fn test_second_submit_is_rejected_while_busy() {
        let mut mock = MockApi::new();
        expect_submit(&mut mock);
        mock.expect_status()
            .returning(|_| Ok(job(JobStatus::Processing)));
        mock.expect_cancel().times(1).returning(|_| Ok(()));

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("First", Some("v1"), None).unwrap();

        let second = controller.generate("Second", Some("v1"), None);
        assert!(matches!(second, Err(GenerationError::Busy)));

        controller.cancel();
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_cancel_clears_state_even_when_remote_cancel_fails() {
        let mut mock = MockApi::new();
        expect_submit(&mut mock);
        mock.expect_status()
            .returning(|_| Ok(job(JobStatus::Processing)));
        mock.expect_cancel()
            .with(eq("job-1"))
            .times(1)
            .returning(|_| Err(ApiError::ConnectionFailed("unreachable".to_string())));

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("Hello", Some("v1"), None).unwrap();
        thread::sleep(TICK * 3);

        controller.cancel();

        assert_eq!(controller.state(), GenerationState::Idle);
        assert!(controller.cancel_handle().is_none());
        assert!(matches!(
            controller.wait(None, |_| {}),
            Err(GenerationError::NotRunning)
        ));
    }

    #[test]
    fn test_cancel_handle_from_another_thread() {
        let mut mock = MockApi::new();
        expect_submit(&mut mock);
        mock.expect_status()
            .returning(|_| Ok(job(JobStatus::Processing)));
        mock.expect_cancel().times(1).returning(|_| Ok(()));

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("Hello", Some("v1"), None).unwrap();

        let handle = controller.cancel_handle().unwrap();
        let canceller = thread::spawn(move || {
            thread::sleep(TICK * 3);
            handle.cancel();
        });

        let outcome = controller.wait(None, |_| {}).unwrap();
        canceller.join().unwrap();

        assert_eq!(outcome, GenerationOutcome::Cancelled);
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_wait_timeout_cancels_job() {
        let mut mock = MockApi::new();
        expect_submit(&mut mock);
        mock.expect_status()
            .returning(|_| Ok(job(JobStatus::Pending)));
        mock.expect_cancel().times(1).returning(|_| Ok(()));

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("Hello", Some("v1"), None).unwrap();

        let mut saw_cancel = false;
        let outcome = controller
            .wait(Some(TICK * 4), |e| {
                saw_cancel |= *e == GenerationEvent::Cancelled;
            })
            .unwrap();

        assert_eq!(outcome, GenerationOutcome::Cancelled);
        assert!(saw_cancel);
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_job_finishing_during_timeout_keeps_its_result() {
        let mut mock = MockApi::new();
        expect_submit(&mut mock);
        // The only status check is still in flight when the deadline passes.
        mock.expect_status().times(1).returning(|_| {
            thread::sleep(TICK * 5);
            Ok(job(JobStatus::Completed))
        });
        mock.expect_cancel().never();

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("Hello", Some("v1"), None).unwrap();

        let mut events = Vec::new();
        let outcome = controller
            .wait(Some(TICK * 2), |e| events.push(e.clone()))
            .unwrap();

        assert_eq!(outcome, GenerationOutcome::Completed(job(JobStatus::Completed)));
        assert_eq!(events, vec![GenerationEvent::Completed(job(JobStatus::Completed))]);
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_drop_stops_polling_without_remote_cancel() {
        let mut mock = MockApi::new();
        expect_submit(&mut mock);
        mock.expect_status()
            .returning(|_| Ok(job(JobStatus::Processing)));
        mock.expect_cancel().never();

        let mut controller = GenerationController::with_interval(Arc::new(mock), TICK);
        controller.generate("Hello", Some("v1"), None).unwrap();
        thread::sleep(TICK * 2);

        drop(controller);
    }
}

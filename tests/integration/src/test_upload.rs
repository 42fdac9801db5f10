//! Large-file upload integration tests.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rustb2_client::{ChunkPlanner, Uploader};
    use rustb2_core::B2Error;
    use rustb2_model::ErrorCode;
    use sha1::{Digest, Sha1};

    use crate::fake_b2::{FakeB2, FakeState, PartFailure};
    use crate::{test_client, test_config, test_data, write_source};

    #[tokio::test]
    async fn test_should_round_trip_large_file() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("videos");
        let config = test_config(&fake, 4, 0);
        let client = test_client(&config);
        let dir = tempfile::tempdir().expect("tempdir");
        let data = test_data(1_050);
        let source = write_source(&dir, "movie.bin", &data);

        let file = Uploader::from_config(client.clone(), &config)
            .upload(&source, "videos/2024/")
            .await
            .expect("upload large file");
        assert_eq!(file.file_name, "2024/movie.bin");
        assert_eq!(file.action, "upload");

        let state = fake.state();
        assert_eq!(FakeState::count(&state.start_calls), 1);
        assert_eq!(FakeState::count(&state.part_uploads), 11);
        assert_eq!(FakeState::count(&state.part_url_calls), 1);
        assert_eq!(FakeState::count(&state.finish_calls), 1);
        assert_eq!(FakeState::count(&state.cancel_calls), 0);
        assert_eq!(state.open_large_files(), 0);

        let info = state
            .file_info("videos", "2024/movie.bin")
            .expect("file info");
        assert_eq!(info["large_file_sha1"], hex::encode(Sha1::digest(&data)));
        let modified: i64 = info["src_last_modified_millis"]
            .as_str()
            .expect("modification time")
            .parse()
            .expect("numeric modification time");
        assert!(modified > 0);

        let target = dir.path().join("downloaded.bin");
        let written = client
            .download_file_by_name("videos", "2024/movie.bin", &target)
            .await
            .expect("download");
        assert_eq!(written, 1_050);
        assert_eq!(std::fs::read(&target).expect("read download"), data);
    }

    #[tokio::test]
    async fn test_should_split_exact_multiple_into_equal_parts() {
        let fake = FakeB2::start(6).await;
        fake.add_bucket("tiny");
        let config = test_config(&fake, 4, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let data = test_data(24);
        let source = write_source(&dir, "24.bin", &data);

        Uploader::from_config(test_client(&config), &config)
            .upload(&source, "tiny")
            .await
            .expect("upload");

        assert_eq!(FakeState::count(&fake.state().part_uploads), 4);
        assert_eq!(
            fake.state().file_data("tiny", "24.bin").expect("stored file"),
            data
        );
    }

    #[tokio::test]
    async fn test_should_grow_parts_to_fit_custom_part_limit() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("capped");
        let config = test_config(&fake, 2, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let data = test_data(1_000);
        let source = write_source(&dir, "capped.bin", &data);

        Uploader::from_config(test_client(&config), &config)
            .with_planner(ChunkPlanner::with_max_part_count(4))
            .upload(&source, "capped")
            .await
            .expect("upload");

        let state = fake.state();
        assert_eq!(FakeState::count(&state.part_uploads), 4);
        assert_eq!(
            state.file_data("capped", "capped.bin").expect("stored file"),
            data
        );
    }

    #[tokio::test]
    async fn test_should_cancel_once_and_never_finish_when_part_fails() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("videos");
        fake.fail_part(PartFailure {
            part_number: 3,
            status: 400,
            code: ErrorCode::BAD_REQUEST,
            times: u32::MAX,
        });
        let config = test_config(&fake, 4, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let source = write_source(&dir, "movie.bin", &test_data(1_000));

        let err = Uploader::from_config(test_client(&config), &config)
            .upload(&source, "videos")
            .await
            .expect_err("upload should fail");

        assert!(
            matches!(err, B2Error::Api { status: 400, ref message, .. } if message.contains("part 3")),
            "unexpected error: {err}"
        );
        let state = fake.state();
        assert_eq!(FakeState::count(&state.cancel_calls), 1);
        assert_eq!(FakeState::count(&state.finish_calls), 0);
        assert_eq!(state.open_large_files(), 0);
        assert!(state.file_data("videos", "movie.bin").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_never_exceed_worker_count_in_flight() {
        let fake = FakeB2::start_with_delay(10, Duration::from_millis(20)).await;
        fake.add_bucket("busy");
        let config = test_config(&fake, 3, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let data = test_data(400);
        let source = write_source(&dir, "parts.bin", &data);

        Uploader::from_config(test_client(&config), &config)
            .upload(&source, "busy")
            .await
            .expect("upload");

        let state = fake.state();
        assert_eq!(FakeState::count(&state.part_uploads), 40);
        let max = FakeState::count(&state.max_in_flight);
        assert!(max <= 3, "saw {max} concurrent part uploads");
        assert!(max > 1, "part uploads never overlapped");
        assert_eq!(state.file_data("busy", "parts.bin").expect("stored"), data);
    }

    #[tokio::test]
    async fn test_should_retry_transient_part_failure_within_budget() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("videos");
        fake.fail_part(PartFailure {
            part_number: 2,
            status: 503,
            code: ErrorCode::SERVICE_UNAVAILABLE,
            times: 1,
        });
        let config = test_config(&fake, 2, 1);
        let dir = tempfile::tempdir().expect("tempdir");
        let data = test_data(1_000);
        let source = write_source(&dir, "movie.bin", &data);

        Uploader::from_config(test_client(&config), &config)
            .upload(&source, "videos")
            .await
            .expect("upload after retry");

        let state = fake.state();
        assert_eq!(FakeState::count(&state.part_uploads), 11);
        assert_eq!(FakeState::count(&state.part_url_calls), 2);
        assert_eq!(FakeState::count(&state.finish_calls), 1);
        assert_eq!(FakeState::count(&state.cancel_calls), 0);
        assert_eq!(state.file_data("videos", "movie.bin").expect("stored"), data);
    }

    #[tokio::test]
    async fn test_should_not_retry_transient_failure_without_budget() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("videos");
        fake.fail_part(PartFailure {
            part_number: 2,
            status: 503,
            code: ErrorCode::SERVICE_UNAVAILABLE,
            times: 1,
        });
        let config = test_config(&fake, 2, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let source = write_source(&dir, "movie.bin", &test_data(1_000));

        let err = Uploader::from_config(test_client(&config), &config)
            .upload(&source, "videos")
            .await
            .expect_err("upload should fail");

        assert!(err.is_retryable());
        assert_eq!(FakeState::count(&fake.state().cancel_calls), 1);
        assert_eq!(FakeState::count(&fake.state().finish_calls), 0);
    }

    #[tokio::test]
    async fn test_should_fetch_new_part_url_after_expired_part_token() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("videos");
        fake.fail_part(PartFailure {
            part_number: 4,
            status: 401,
            code: ErrorCode::EXPIRED_AUTH_TOKEN,
            times: 1,
        });
        let config = test_config(&fake, 3, 1);
        let dir = tempfile::tempdir().expect("tempdir");
        let data = test_data(650);
        let source = write_source(&dir, "movie.bin", &data);

        Uploader::from_config(test_client(&config), &config)
            .upload(&source, "videos")
            .await
            .expect("upload with a fresh part URL");

        let state = fake.state();
        assert_eq!(FakeState::count(&state.part_uploads), 8);
        assert_eq!(FakeState::count(&state.part_url_calls), 2);
        assert_eq!(FakeState::count(&state.authorize_calls), 1);
        assert_eq!(state.file_data("videos", "movie.bin").expect("stored"), data);
    }
}

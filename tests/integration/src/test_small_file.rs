//! Small-file upload, bucket lookup, and download integration tests.

#[cfg(test)]
mod tests {
    use rustb2_client::Uploader;
    use rustb2_core::B2Error;

    use crate::fake_b2::{FakeB2, FakeState};
    use crate::{test_client, test_config, test_data, write_source};

    #[tokio::test]
    async fn test_should_upload_small_file_in_one_request() {
        let fake = FakeB2::start(1_000).await;
        fake.add_bucket("docs");
        let config = test_config(&fake, 4, 0);
        let client = test_client(&config);
        let dir = tempfile::tempdir().expect("tempdir");
        let data = test_data(300);
        let source = write_source(&dir, "my notes.txt", &data);

        let file = Uploader::from_config(client.clone(), &config)
            .upload(&source, "docs/2024 notes/")
            .await
            .expect("upload small file");

        assert_eq!(file.file_name, "2024 notes/my notes.txt");
        assert!(file.file_info.contains_key("src_last_modified_millis"));
        let state = fake.state();
        assert_eq!(FakeState::count(&state.upload_url_calls), 1);
        assert_eq!(FakeState::count(&state.start_calls), 0);

        let target = dir.path().join("copy.txt");
        client
            .download_file_by_name("docs", "2024 notes/my notes.txt", &target)
            .await
            .expect("download");
        assert_eq!(std::fs::read(&target).expect("read download"), data);
    }

    #[tokio::test]
    async fn test_should_keep_file_at_threshold_on_small_path() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("docs");
        let config = test_config(&fake, 4, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let source = write_source(&dir, "exact.bin", &test_data(100));

        Uploader::from_config(test_client(&config), &config)
            .upload(&source, "docs/renamed.bin")
            .await
            .expect("upload");

        assert_eq!(FakeState::count(&fake.state().start_calls), 0);
        assert!(fake.state().file_data("docs", "renamed.bin").is_some());
    }

    #[tokio::test]
    async fn test_should_switch_to_large_file_just_above_threshold() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("docs");
        let config = test_config(&fake, 4, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let data = test_data(101);
        let source = write_source(&dir, "over.bin", &data);

        Uploader::from_config(test_client(&config), &config)
            .upload(&source, "docs")
            .await
            .expect("upload");

        let state = fake.state();
        assert_eq!(FakeState::count(&state.start_calls), 1);
        assert_eq!(FakeState::count(&state.part_uploads), 2);
        assert_eq!(state.file_data("docs", "over.bin").expect("stored"), data);
    }

    #[tokio::test]
    async fn test_should_upload_empty_file() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("docs");
        let config = test_config(&fake, 4, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let source = write_source(&dir, "empty", &[]);

        Uploader::from_config(test_client(&config), &config)
            .upload(&source, "docs")
            .await
            .expect("upload");

        assert_eq!(
            fake.state().file_data("docs", "empty").expect("stored").len(),
            0
        );
    }

    #[tokio::test]
    async fn test_should_report_unknown_bucket_before_starting() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("docs");
        let config = test_config(&fake, 4, 0);
        let dir = tempfile::tempdir().expect("tempdir");
        let source = write_source(&dir, "big.bin", &test_data(1_000));

        let err = Uploader::from_config(test_client(&config), &config)
            .upload(&source, "missing/big.bin")
            .await
            .expect_err("upload should fail");

        assert!(matches!(err, B2Error::BucketNotFound { ref name } if name == "missing"));
        assert_eq!(FakeState::count(&fake.state().start_calls), 0);
        assert_eq!(FakeState::count(&fake.state().upload_url_calls), 0);
    }

    #[tokio::test]
    async fn test_should_report_missing_remote_file() {
        let fake = FakeB2::start(100).await;
        fake.add_bucket("docs");
        let config = test_config(&fake, 4, 0);
        let dir = tempfile::tempdir().expect("tempdir");

        let target = dir.path().join("out");
        std::fs::write(&target, b"previous contents").expect("seed destination");

        let err = test_client(&config)
            .download_file_by_name("docs", "nothing-here", &target)
            .await
            .expect_err("download should fail");

        assert!(matches!(err, B2Error::Api { status: 404, .. }));
        assert_eq!(
            std::fs::read(&target).expect("read destination"),
            b"previous contents"
        );
        assert_eq!(dir_entries(dir.path()), vec!["out".to_owned()]);
    }

    #[tokio::test]
    async fn test_should_replace_existing_destination_on_download() {
        let fake = FakeB2::start(1_000).await;
        fake.add_bucket("docs");
        let config = test_config(&fake, 4, 0);
        let client = test_client(&config);
        let src_dir = tempfile::tempdir().expect("tempdir");
        let data = test_data(64);
        let source = write_source(&src_dir, "report.txt", &data);
        Uploader::from_config(client.clone(), &config)
            .upload(&source, "docs")
            .await
            .expect("upload");

        let out_dir = tempfile::tempdir().expect("tempdir");
        let target = out_dir.path().join("report.txt");
        std::fs::write(&target, test_data(4_096)).expect("seed destination");

        let written = client
            .download_file_by_name("docs", "report.txt", &target)
            .await
            .expect("download");

        assert_eq!(written, 64);
        assert_eq!(std::fs::read(&target).expect("read download"), data);
        assert_eq!(dir_entries(out_dir.path()), vec!["report.txt".to_owned()]);
    }

    fn dir_entries(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

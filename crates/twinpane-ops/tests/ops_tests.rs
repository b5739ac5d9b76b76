use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use twinpane_core::{ItemKind, SortKey, SortOrder};
use twinpane_ops::{
    start_folder_size_queue, CompletionMarker, DirectoryService, FileMutationService, HostRoot,
    ListRequest, ListResponse, LocalDirectoryService, LocalMutationService, LocalShell,
    LocalTransfers, MutationError, MutationRequest, TerminalEvent, TerminalLaunch,
    TerminalTransport, TransferService,
};

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("Beta")).unwrap();
    fs::create_dir(dir.path().join("alpha")).unwrap();
    fs::write(dir.path().join("zeta.txt"), "0123456789").unwrap();
    fs::write(dir.path().join("Apple.md"), "x").unwrap();
    fs::write(dir.path().join(".hidden"), "").unwrap();
    fs::write(dir.path().join("alpha/inner.txt"), "abc").unwrap();
    dir
}

fn names(response: &ListResponse) -> Vec<String> {
    match response {
        ListResponse::Directory { items, .. } => items.iter().map(|i| i.name.to_string()).collect(),
        other => panic!("expected a directory listing, got {other:?}"),
    }
}

#[tokio::test]
async fn test_listing_root_sorts_dirs_first() {
    let dir = fixture();
    let service = LocalDirectoryService::new(HostRoot::new(dir.path()));

    let response = service.list(ListRequest::new("/")).await.unwrap();
    assert_eq!(names(&response), vec!["alpha", "Beta", "Apple.md", "zeta.txt"]);
}

#[tokio::test]
async fn test_listing_subdir_has_parent_marker() {
    let dir = fixture();
    let service = LocalDirectoryService::new(HostRoot::new(dir.path()));

    let response = service.list(ListRequest::new("/alpha")).await.unwrap();
    let ListResponse::Directory { current_path, items } = response else {
        panic!("expected directory");
    };
    assert_eq!(current_path, "/alpha");
    assert_eq!(items[0].kind, ItemKind::ParentMarker);
    assert_eq!(items[0].path, "/");
    assert_eq!(items[1].path, "/alpha/inner.txt");
}

#[tokio::test]
async fn test_listing_dotfiles_and_descending_size() {
    let dir = fixture();
    let service = LocalDirectoryService::new(HostRoot::new(dir.path()));

    let request = ListRequest {
        path: "/".into(),
        show_dotfiles: true,
        sort_by: SortKey::Size,
        order: SortOrder::Desc,
    };
    let response = service.list(request).await.unwrap();
    let files: Vec<String> = names(&response).into_iter().skip(2).collect();
    assert_eq!(files, vec!["zeta.txt", "Apple.md", ".hidden"]);
}

#[tokio::test]
async fn test_listing_file_and_missing_paths() {
    let dir = fixture();
    let service = LocalDirectoryService::new(HostRoot::new(dir.path()));

    let file = service.list(ListRequest::new("/zeta.txt")).await.unwrap();
    assert_eq!(
        file,
        ListResponse::IsFile {
            current_path: "/zeta.txt".into()
        }
    );

    let missing = service.list(ListRequest::new("/nope")).await.unwrap();
    assert_eq!(missing, ListResponse::Error("Path not found: /nope".into()));
}

#[tokio::test]
async fn test_mutations() {
    let dir = fixture();
    let service = LocalMutationService::new(HostRoot::new(dir.path()));

    let renamed = service
        .apply(MutationRequest::Rename {
            source: "/zeta.txt".into(),
            destination: "/omega.txt".into(),
        })
        .await
        .unwrap();
    assert_eq!(renamed, "/omega.txt");
    assert!(dir.path().join("omega.txt").exists());

    service
        .apply(MutationRequest::Duplicate {
            source: "/alpha".into(),
            destination: "/alpha_copy".into(),
        })
        .await
        .unwrap();
    assert!(dir.path().join("alpha_copy/inner.txt").exists());

    service
        .apply(MutationRequest::CreateFile {
            path: "/new/deep/file.txt".into(),
        })
        .await
        .unwrap();
    assert!(dir.path().join("new/deep/file.txt").is_file());

    let exists = service
        .apply(MutationRequest::CreateDirectory {
            path: "/alpha".into(),
        })
        .await;
    assert!(matches!(exists, Err(MutationError::AlreadyExists { .. })));

    let missing = service
        .apply(MutationRequest::Rename {
            source: "/ghost".into(),
            destination: "/spirit".into(),
        })
        .await;
    assert!(matches!(missing, Err(MutationError::SourceMissing { .. })));
}

#[tokio::test]
async fn test_folder_sizes_arrive_in_order() {
    let dir = fixture();
    let (queue, mut results) = start_folder_size_queue(HostRoot::new(dir.path()));
    assert!(queue.enqueue("/alpha"));
    assert!(queue.enqueue("/zeta.txt"));

    let first = results.recv().await.unwrap();
    assert_eq!(first.path, "/alpha");
    assert_eq!(first.bytes, Ok(3));

    let second = results.recv().await.unwrap();
    assert_eq!(second.path, "/zeta.txt");
    assert_eq!(second.display(), "ERR");
}

#[tokio::test]
async fn test_upload_and_download() {
    let served = fixture();
    let outside = TempDir::new().unwrap();
    let upload = outside.path().join("report.pdf");
    fs::write(&upload, "pdf").unwrap();
    let clash = outside.path().join("zeta.txt");
    fs::write(&clash, "clash").unwrap();

    let transfers = LocalTransfers::new(HostRoot::new(served.path()), outside.path().join("dl"));
    let outcome = transfers.upload("/alpha".into(), vec![upload]).await;
    assert_eq!(outcome.saved, vec!["/alpha/report.pdf".to_string()]);
    assert!(outcome.failed.is_empty());

    let outcome = transfers.upload("/".into(), vec![clash]).await;
    assert!(outcome.saved.is_empty());
    assert_eq!(outcome.failed[0].1, "File already exists");

    let stored = transfers.download("/zeta.txt".into()).await.unwrap();
    assert_eq!(fs::read_to_string(stored).unwrap(), "0123456789");
}

#[tokio::test]
async fn test_local_shell_reports_marker_and_exit() {
    let dir = fixture();
    let marker = CompletionMarker::new();
    let mut detector = marker.detector().unwrap();

    let mut session = LocalShell::default()
        .connect(TerminalLaunch {
            command: marker.wrap("ls"),
            cwd: Some(dir.path().to_string_lossy().into_owned()),
        })
        .unwrap();

    let mut completed = false;
    let mut exit = None;
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(10), session.events.recv()).await {
        match event {
            TerminalEvent::Connected => {}
            TerminalEvent::Output(chunk) => completed |= detector.feed(&chunk),
            TerminalEvent::Exited(code) => {
                exit = Some(code);
                break;
            }
        }
    }
    assert!(completed);
    assert_eq!(exit, Some(Some(0)));
}

#[tokio::test]
async fn test_cancelled_session_exits() {
    let mut session = LocalShell::default()
        .connect(TerminalLaunch {
            command: "sleep 30".into(),
            cwd: None,
        })
        .unwrap();
    session.cancel.cancel();

    let mut exited = false;
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(10), session.events.recv()).await {
        if let TerminalEvent::Exited(code) = event {
            assert_eq!(code, None);
            exited = true;
            break;
        }
    }
    assert!(exited);
}

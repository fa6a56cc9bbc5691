//! End-to-end object lifecycle against an in-memory chat.

use std::sync::Arc;

use tgfs_store::{
    CancellationToken, ChatId, ChatStore, HashKind, InMemoryBot, Operation, SizeSource,
    StoreError, MAX_ATTACHMENT_SIZE,
};
use tokio::io::AsyncReadExt;

const CHAT: ChatId = ChatId::new(-1_009_876_543_210);

async fn connect(bot: &Arc<InMemoryBot>) -> ChatStore {
    ChatStore::new("tg", bot.clone(), &CancellationToken::new())
        .await
        .expect("store should connect")
}

#[tokio::test]
async fn upload_open_remove_open() {
    let bot = Arc::new(InMemoryBot::new(CHAT));
    let store = connect(&bot).await;
    let cancel = CancellationToken::new();
    let payload: Vec<u8> = (0..100u8).collect();

    let obj = store
        .put(&cancel, std::io::Cursor::new(payload.clone()), 100, "notes.txt")
        .await
        .unwrap();
    let remote = obj.remote().to_string();
    assert!(remote.starts_with('/'));
    assert!(remote.len() > 1);
    assert_eq!(obj.size(), 100);
    assert_eq!(obj.name(), "notes.txt");

    let mut content = Vec::new();
    obj.open(&cancel)
        .await
        .unwrap()
        .read_to_end(&mut content)
        .await
        .unwrap();
    assert_eq!(content, payload);

    obj.remove(&cancel).await.unwrap();

    let err = obj.open(&cancel).await.err().expect("open after remove must fail");
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn resolve_by_path_matches_platform_metadata() {
    let bot = Arc::new(InMemoryBot::new(CHAT));
    let store = connect(&bot).await;
    let cancel = CancellationToken::new();

    let uploaded = store
        .put(&cancel, &b"quarterly numbers"[..], 17, "/q3.csv")
        .await
        .unwrap();
    let resolved = store
        .new_object(&cancel, &uploaded.remote().to_string())
        .await
        .unwrap();

    assert_eq!(resolved.remote(), uploaded.remote());
    assert_eq!(resolved.name(), "q3.csv");
    assert_eq!(resolved.size(), 17);
    assert_eq!(resolved.size_source(), SizeSource::Reported);
    assert_eq!(bot.calls().meta, 1);
    assert_eq!(bot.calls().download, 0);
}

#[tokio::test]
async fn same_file_uploaded_twice_gets_two_paths() {
    let bot = Arc::new(InMemoryBot::new(CHAT));
    let store = connect(&bot).await;
    let cancel = CancellationToken::new();

    let a = store.put(&cancel, &b"same"[..], 4, "dup.txt").await.unwrap();
    let b = store.put(&cancel, &b"same"[..], 4, "dup.txt").await.unwrap();
    assert_ne!(a.remote(), b.remote());

    a.remove(&cancel).await.unwrap();
    let mut content = Vec::new();
    b.open(&cancel)
        .await
        .unwrap()
        .read_to_end(&mut content)
        .await
        .unwrap();
    assert_eq!(content, b"same");
}

#[tokio::test]
async fn three_gib_upload_is_rejected_up_front() {
    let bot = Arc::new(InMemoryBot::new(CHAT));
    let store = connect(&bot).await;
    let before = bot.calls();

    let err = store
        .put(&CancellationToken::new(), &b""[..], 3 << 30, "huge.bin")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::SizeLimitExceeded { limit, .. } if limit == MAX_ATTACHMENT_SIZE
    ));
    assert_eq!(bot.calls(), before);
    assert!(bot.is_empty());
}

#[tokio::test]
async fn unsupported_surface_makes_no_calls() {
    let bot = Arc::new(InMemoryBot::new(CHAT));
    let store = connect(&bot).await;
    let cancel = CancellationToken::new();
    let obj = store.put(&cancel, &b"x"[..], 1, "x").await.unwrap();
    let before = bot.calls();

    let results = [
        store.list(&cancel, "/").await.map(|_| ()),
        store.mkdir(&cancel, "/d").await,
        store.rmdir(&cancel, "/d").await,
        obj.set_mod_time(&cancel, chrono::Utc::now()).await,
        obj.update(&cancel, &b"y"[..], 1).await,
        obj.hash(HashKind::Sha256).map(|_| ()),
    ];
    for result in results {
        let err = result.unwrap_err();
        assert!(err.is_unsupported(), "got {err:?}");
        assert!(err.to_string().contains("not supported"));
    }
    assert_eq!(bot.calls(), before);
    assert!(Operation::ALL
        .iter()
        .filter(|op| !op.is_supported())
        .all(|op| !store.features().contains(op)));
}

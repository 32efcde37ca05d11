use async_trait::async_trait;
use chrono_tz::Tz;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use archiver::core::models::{
    ArchiveTask, FileInfo, FileRef, Message, ShortcutEvent, ThreadContext,
};
use archiver::errors::ArchiveError;
use archiver::slack::ChatApi;
use archiver::storage::BlobStore;
use archiver::worker::archive::{self, ArchiveOutcome, ArchiveSettings, COMPLETION_REACTION};

const ARCHIVE_CHANNEL: &str = "CARCHIVE";
const ARCHIVE_TS: &str = "900.1";

// ─────────────────────────────────────────────────────────────────────────────
// Test doubles
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    UserName(String),
    MessageAt(String, String),
    Thread(String, String),
    PostMessage(String, String),
    FileInfo(String),
    Download(String),
    Upload {
        channel: String,
        filename: String,
        bytes: Vec<u8>,
        thread_ts: Option<String>,
    },
    Reaction {
        channel: String,
        name: String,
        ts: String,
    },
}

#[derive(Default)]
struct FakeChat {
    users: HashMap<String, String>,
    message: Option<Message>,
    thread: Option<ThreadContext>,
    files: HashMap<String, FileInfo>,
    failing_file_info: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeChat {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn with_file(mut self, id: &str, name: &str) -> Self {
        self.files.insert(
            id.to_string(),
            FileInfo {
                id: id.to_string(),
                name: name.to_string(),
                url_private: format!("https://files.slack.com/{id}/{name}"),
            },
        );
        self
    }

    fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload { filename, .. } => Some(filename),
                _ => None,
            })
            .collect()
    }

    fn reactions(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Reaction { .. }))
            .count()
    }
}

#[async_trait]
impl ChatApi for FakeChat {
    async fn user_name(&self, user_id: &str) -> Result<String, ArchiveError> {
        self.record(Call::UserName(user_id.to_string()));
        Ok(self
            .users
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string()))
    }

    async fn message_at(&self, channel_id: &str, ts: &str) -> Result<Message, ArchiveError> {
        self.record(Call::MessageAt(channel_id.to_string(), ts.to_string()));
        self.message
            .clone()
            .ok_or_else(|| ArchiveError::NotFound(format!("no message at {ts}")))
    }

    async fn thread(
        &self,
        channel_id: &str,
        thread_ts: &str,
    ) -> Result<ThreadContext, ArchiveError> {
        self.record(Call::Thread(channel_id.to_string(), thread_ts.to_string()));
        Ok(self.thread.clone().unwrap_or_default())
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String, ArchiveError> {
        self.record(Call::PostMessage(channel_id.to_string(), text.to_string()));
        Ok(ARCHIVE_TS.to_string())
    }

    async fn file_info(&self, file_id: &str) -> Result<FileInfo, ArchiveError> {
        self.record(Call::FileInfo(file_id.to_string()));
        if self.failing_file_info.contains(file_id) {
            return Err(ArchiveError::ApiError("files.info error: file_not_found".into()));
        }
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| ArchiveError::NotFound(file_id.to_string()))
    }

    async fn download_file(&self, url: &str) -> Result<Vec<u8>, ArchiveError> {
        self.record(Call::Download(url.to_string()));
        Ok(format!("bytes of {url}").into_bytes())
    }

    async fn upload_file(
        &self,
        channel_id: &str,
        filename: &str,
        content: &[u8],
        thread_ts: Option<&str>,
    ) -> Result<(), ArchiveError> {
        self.record(Call::Upload {
            channel: channel_id.to_string(),
            filename: filename.to_string(),
            bytes: content.to_vec(),
            thread_ts: thread_ts.map(str::to_string),
        });
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: &str,
        name: &str,
        ts: &str,
    ) -> Result<(), ArchiveError> {
        self.record(Call::Reaction {
            channel: channel_id.to_string(),
            name: name.to_string(),
            ts: ts.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
struct FakeStore {
    failing_keys: HashSet<String>,
    puts: Mutex<Vec<(String, Vec<u8>, String)>>,
}

impl FakeStore {
    fn keys(&self) -> Vec<String> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .map(|(k, _, _)| k.clone())
            .collect()
    }

    fn body(&self, key: &str) -> Option<Vec<u8>> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _, _)| k == key)
            .map(|(_, b, _)| b.clone())
    }
}

#[async_trait]
impl BlobStore for FakeStore {
    async fn put_object(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), ArchiveError> {
        if self.failing_keys.contains(key) {
            return Err(ArchiveError::AwsError(format!("Failed to put {key}")));
        }
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), body.to_vec(), content_type.to_string()));
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

fn settings() -> ArchiveSettings {
    ArchiveSettings {
        archive_channel_id: ARCHIVE_CHANNEL.to_string(),
        timezone: Tz::UTC,
    }
}

fn task(channel_id: &str, ts: &str, thread_ts: Option<&str>) -> ArchiveTask {
    ArchiveTask {
        correlation_id: "corr-1".to_string(),
        event: ShortcutEvent {
            user_id: "U1".to_string(),
            channel_id: channel_id.to_string(),
            message_ts: ts.to_string(),
            thread_ts: thread_ts.map(str::to_string),
        },
    }
}

fn file_ref(id: &str) -> FileRef {
    FileRef {
        id: id.to_string(),
        name: None,
        url_private: None,
    }
}

fn message(user: &str, ts: &str, text: &str, files: &[&str]) -> Message {
    Message {
        user: user.to_string(),
        ts: ts.to_string(),
        text: text.to_string(),
        files: files.iter().map(|id| file_ref(id)).collect(),
    }
}

fn chat_with_message(msg: Message) -> FakeChat {
    let mut chat = FakeChat {
        message: Some(msg),
        ..Default::default()
    };
    chat.users.insert("U1".into(), "Alice".into());
    chat.users.insert("U9".into(), "Bob".into());
    chat
}

// ─────────────────────────────────────────────────────────────────────────────
// Guard
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn archive_channel_invocation_is_a_no_op() {
    let chat = chat_with_message(message("U9", "100.1", "hello", &["F1"]));
    let store = FakeStore::default();

    let outcome = archive::run(&task(ARCHIVE_CHANNEL, "100.1", None), &chat, &store, &settings())
        .await
        .unwrap();

    assert_eq!(outcome, ArchiveOutcome::SkippedArchiveChannel);
    assert_eq!(chat.calls(), vec![Call::UserName("U1".into())]);
    assert!(store.keys().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Happy paths
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_single_file_without_thread() {
    let chat = chat_with_message(message("U9", "100.1", "hello", &["F1"])).with_file("F1", "photo.png");
    let store = FakeStore::default();

    let outcome = archive::run(&task("C2", "100.1", None), &chat, &store, &settings())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ArchiveOutcome::Archived {
            record_key: "messages/C2/100.1.txt".into(),
            archive_ts: ARCHIVE_TS.into(),
            files_relayed: 1,
        }
    );

    assert_eq!(
        store.keys(),
        vec!["messages/C2/100.1.txt".to_string(), "files/F1/photo.png".to_string()]
    );

    let calls = chat.calls();
    let posts: Vec<&Call> = calls
        .iter()
        .filter(|c| matches!(c, Call::PostMessage(..)))
        .collect();
    assert_eq!(posts.len(), 1);
    assert!(matches!(posts[0], Call::PostMessage(ch, _) if ch == ARCHIVE_CHANNEL));

    let expected_bytes = b"bytes of https://files.slack.com/F1/photo.png".to_vec();
    assert!(calls.contains(&Call::Upload {
        channel: ARCHIVE_CHANNEL.into(),
        filename: "photo.png".into(),
        bytes: expected_bytes.clone(),
        thread_ts: Some(ARCHIVE_TS.into()),
    }));
    assert_eq!(store.body("files/F1/photo.png"), Some(expected_bytes));

    assert_eq!(
        calls.last(),
        Some(&Call::Reaction {
            channel: "C2".into(),
            name: COMPLETION_REACTION.into(),
            ts: "100.1".into(),
        })
    );
    assert!(!calls.iter().any(|c| matches!(c, Call::Thread(..))));
}

#[tokio::test]
async fn stored_record_matches_posted_record() {
    let chat = chat_with_message(message("U9", "100.1", "hello", &[]));
    let store = FakeStore::default();

    archive::run(&task("C2", "100.1", None), &chat, &store, &settings())
        .await
        .unwrap();

    let expected = "このメッセージ保存を実行したユーザー: Alice (<@U1>)\n\n\
                    投稿者: Bob (<@U9>)\n\
                    日時: 1970/01/01 00:01:40\n\
                    リンク: https://slack.com/archives/C2/p1001\n\
                    メッセージ:\nhello\n\n";

    let stored = String::from_utf8(store.body("messages/C2/100.1.txt").unwrap()).unwrap();
    assert_eq!(stored, expected);
    assert!(
        chat.calls()
            .contains(&Call::PostMessage(ARCHIVE_CHANNEL.into(), expected.into()))
    );
}

#[tokio::test]
async fn thread_replies_are_transcribed_and_their_files_relayed() {
    let root = message("U9", "100.1", "root text", &["F1"]);
    let mut chat = chat_with_message(root.clone())
        .with_file("F1", "root.png")
        .with_file("F2", "first.txt")
        .with_file("F3", "second.txt");
    chat.thread = Some(ThreadContext {
        messages: vec![
            root,
            message("U7", "160.2", "first reply", &["F2"]),
            message("U8", "220.3", "second reply", &["F3"]),
        ],
    });
    let store = FakeStore::default();

    let outcome = archive::run(&task("C2", "100.1", Some("100.1")), &chat, &store, &settings())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        ArchiveOutcome::Archived { files_relayed: 3, .. }
    ));
    assert!(chat.calls().contains(&Call::Thread("C2".into(), "100.1".into())));
    assert_eq!(chat.uploads(), ["root.png", "first.txt", "second.txt"]);

    let record = String::from_utf8(store.body("messages/C2/100.1.txt").unwrap()).unwrap();
    let (_, transcript) = record.split_once("スレッド:\n").unwrap();
    assert_eq!(
        transcript,
        "投稿者:<@U7>\n日時: 1970/01/01 00:02:40\nメッセージ 1: first reply\n\
         投稿者:<@U8>\n日時: 1970/01/01 00:03:40\nメッセージ 2: second reply"
    );
    assert!(!transcript.contains("root text"));
}

#[tokio::test]
async fn file_shared_by_message_and_reply_is_relayed_once() {
    let target = message("U9", "160.2", "reply with file", &["F2"]);
    let mut chat = chat_with_message(target.clone()).with_file("F2", "shared.pdf");
    chat.thread = Some(ThreadContext {
        messages: vec![message("U7", "100.1", "root", &[]), target],
    });
    let store = FakeStore::default();

    archive::run(&task("C2", "160.2", Some("100.1")), &chat, &store, &settings())
        .await
        .unwrap();

    assert_eq!(chat.uploads(), ["shared.pdf"]);
    assert_eq!(
        store.keys(),
        ["messages/C2/160.2.txt", "files/F2/shared.pdf"]
    );
}

#[tokio::test]
async fn root_files_are_relayed_when_a_reply_is_the_target() {
    let target = message("U9", "160.2", "reply without files", &[]);
    let mut chat = chat_with_message(target.clone()).with_file("F1", "root.png");
    chat.thread = Some(ThreadContext {
        messages: vec![message("U7", "100.1", "root with file", &["F1"]), target],
    });
    let store = FakeStore::default();

    let outcome = archive::run(&task("C2", "160.2", Some("100.1")), &chat, &store, &settings())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        ArchiveOutcome::Archived { files_relayed: 1, .. }
    ));
    assert_eq!(chat.uploads(), ["root.png"]);
    assert_eq!(
        store.keys(),
        ["messages/C2/160.2.txt", "files/F1/root.png"]
    );

    let record = String::from_utf8(store.body("messages/C2/160.2.txt").unwrap()).unwrap();
    let (_, transcript) = record.split_once("スレッド:\n").unwrap();
    assert!(!transcript.contains("root with file"));
    assert!(transcript.contains("メッセージ 1: reply without files"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Failure containment
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn metadata_failure_on_second_file_keeps_first_and_continues() {
    let mut chat = chat_with_message(message("U9", "100.1", "three files", &["F1", "F2", "F3"]))
        .with_file("F1", "one.txt")
        .with_file("F2", "two.txt")
        .with_file("F3", "three.txt");
    chat.failing_file_info.insert("F2".into());
    let store = FakeStore::default();

    let err = archive::run(&task("C2", "100.1", None), &chat, &store, &settings())
        .await
        .unwrap_err();

    assert!(matches!(err, ArchiveError::FileRelay { failed: 1, total: 3 }));
    assert_eq!(chat.uploads(), ["one.txt", "three.txt"]);
    assert_eq!(
        store.keys(),
        ["messages/C2/100.1.txt", "files/F1/one.txt", "files/F3/three.txt"]
    );
    assert_eq!(chat.reactions(), 0);
}

#[tokio::test]
async fn storage_failure_for_one_file_does_not_affect_others() {
    let chat = chat_with_message(message("U9", "100.1", "two files", &["F1", "F2"]))
        .with_file("F1", "one.txt")
        .with_file("F2", "two.txt");
    let store = FakeStore {
        failing_keys: HashSet::from(["files/F1/one.txt".to_string()]),
        ..Default::default()
    };

    let err = archive::run(&task("C2", "100.1", None), &chat, &store, &settings())
        .await
        .unwrap_err();

    assert!(matches!(err, ArchiveError::FileRelay { failed: 1, total: 2 }));
    assert_eq!(chat.uploads(), ["two.txt"]);
    assert_eq!(chat.reactions(), 0);
}

#[tokio::test]
async fn record_storage_failure_aborts_before_republish() {
    let chat = chat_with_message(message("U9", "100.1", "hello", &["F1"])).with_file("F1", "a.txt");
    let store = FakeStore {
        failing_keys: HashSet::from(["messages/C2/100.1.txt".to_string()]),
        ..Default::default()
    };

    let err = archive::run(&task("C2", "100.1", None), &chat, &store, &settings())
        .await
        .unwrap_err();

    assert!(matches!(err, ArchiveError::AwsError(_)));
    let calls = chat.calls();
    assert!(!calls.iter().any(|c| matches!(c, Call::PostMessage(..))));
    assert!(!calls.iter().any(|c| matches!(c, Call::FileInfo(_))));
    assert_eq!(chat.reactions(), 0);
}

#[tokio::test]
async fn handle_swallows_missing_message() {
    let chat = FakeChat::default();
    let store = FakeStore::default();

    // Returns unit; the failure is only logged.
    archive::handle(&task("C2", "100.1", None), &chat, &store, &settings()).await;

    assert!(store.keys().is_empty());
    assert!(chat.calls().contains(&Call::MessageAt("C2".into(), "100.1".into())));
    assert_eq!(chat.reactions(), 0);
}

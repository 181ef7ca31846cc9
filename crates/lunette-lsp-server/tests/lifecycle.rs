use std::thread::JoinHandle;
use std::time::Duration;

use lsp_server::{Connection, Message, Notification, Request, Response};
use lsp_types::notification::Notification as _;
use lsp_types::request::Request as _;
use lunette_lsp_server::Server;
use serde_json::{Value, json};

const URI: &str = "file:///main.lua";

struct Client {
    connection: Connection,
    server: JoinHandle<anyhow::Result<()>>,
    next_id: i32,
}

impl Client {
    fn start(capabilities: Value) -> (Self, Value) {
        let (server_side, connection) = Connection::memory();
        let server = std::thread::spawn(move || Server::initialize(server_side, None)?.run());
        let mut client = Self { connection, server, next_id: 0 };

        let initialized = client.request(
            lsp_types::request::Initialize::METHOD,
            json!({ "processId": null, "rootUri": null, "capabilities": capabilities }),
        );
        client.notify(lsp_types::notification::Initialized::METHOD, json!({}));

        let result = initialized.result.unwrap();
        (client, result)
    }

    fn request(&mut self, method: &str, params: Value) -> Response {
        self.next_id += 1;
        let id = self.next_id;
        self.connection
            .sender
            .send(Request::new(id.into(), method.to_owned(), params).into())
            .unwrap();

        loop {
            match self.connection.receiver.recv_timeout(Duration::from_secs(10)).unwrap() {
                Message::Response(response) if response.id == id.into() => return response,
                _ => {}
            }
        }
    }

    fn notify(&self, method: &str, params: Value) {
        self.connection
            .sender
            .send(Notification::new(method.to_owned(), params).into())
            .unwrap();
    }

    fn open(&self, text: &str) {
        self.notify(
            lsp_types::notification::DidOpenTextDocument::METHOD,
            json!({
                "textDocument": { "uri": URI, "languageId": "lua", "version": 0, "text": text }
            }),
        );
    }

    fn change(&self, text: &str) {
        self.notify(
            lsp_types::notification::DidChangeTextDocument::METHOD,
            json!({
                "textDocument": { "uri": URI, "version": 1 },
                "contentChanges": [{ "text": text }]
            }),
        );
    }

    fn semantic_tokens(&mut self) -> Value {
        let response = self.request(
            lsp_types::request::SemanticTokensFullRequest::METHOD,
            json!({ "textDocument": { "uri": URI } }),
        );
        response.result.unwrap()["data"].clone()
    }

    fn shutdown(mut self) {
        let response = self.request(lsp_types::request::Shutdown::METHOD, Value::Null);
        assert!(response.error.is_none());
        self.notify(lsp_types::notification::Exit::METHOD, Value::Null);
        self.server.join().unwrap().unwrap();
    }
}

#[test]
fn negotiates_utf8() {
    let (client, result) =
        Client::start(json!({ "general": { "positionEncodings": ["utf-8", "utf-16"] } }));

    let capabilities = &result["capabilities"];
    assert_eq!(capabilities["positionEncoding"], "utf-8");
    assert_eq!(capabilities["semanticTokensProvider"]["range"], true);
    assert_eq!(capabilities["semanticTokensProvider"]["legend"]["tokenTypes"][6], "function");
    assert_eq!(
        capabilities["semanticTokensProvider"]["legend"]["tokenModifiers"],
        json!(["declaration", "readonly", "static", "defaultLibrary"])
    );

    client.shutdown();
}

#[test]
fn falls_back_to_utf16() {
    let (client, result) = Client::start(json!({}));
    assert_eq!(result["capabilities"]["positionEncoding"], "utf-16");
    client.shutdown();
}

#[test]
fn semantic_tokens_follow_edits() {
    let (mut client, _) = Client::start(json!({ "general": { "positionEncodings": ["utf-8"] } }));

    client.open("local x = 1\nprint(x)\n");
    assert_eq!(
        client.semantic_tokens(),
        json!([
            0, 0, 5, 1, 0, //
            0, 6, 1, 5, 3, //
            0, 2, 1, 4, 0, //
            0, 2, 1, 3, 0, //
            1, 0, 5, 6, 12, //
            0, 6, 1, 5, 2,
        ])
    );

    client.change("print(1)\n");
    assert_eq!(client.semantic_tokens(), json!([0, 0, 5, 6, 12, 0, 6, 1, 3, 0]));

    client.shutdown();
}

#[test]
fn semantic_tokens_in_range() {
    let (mut client, _) = Client::start(json!({}));

    client.open("local a = 1\nlocal b = 2\n");
    let response = client.request(
        lsp_types::request::SemanticTokensRangeRequest::METHOD,
        json!({
            "textDocument": { "uri": URI },
            "range": { "start": { "line": 1, "character": 0 }, "end": { "line": 1, "character": 7 } }
        }),
    );
    assert_eq!(response.result.unwrap()["data"], json!([1, 0, 5, 1, 0, 0, 6, 1, 5, 3]));

    client.shutdown();
}

#[test]
fn document_diagnostics() {
    let (mut client, _) = Client::start(json!({}));

    client.open("local x <const> = 1\nx = 2\n");
    let response = client.request(
        lsp_types::request::DocumentDiagnosticRequest::METHOD,
        json!({ "textDocument": { "uri": URI } }),
    );
    let report = response.result.unwrap();
    assert_eq!(report["kind"], "full");
    assert_eq!(
        report["items"],
        json!([{
            "range": { "start": { "line": 1, "character": 0 }, "end": { "line": 1, "character": 1 } },
            "severity": 1,
            "source": "lunette",
            "message": "attempt to assign to const variable 'x'"
        }])
    );

    client.shutdown();
}

#[test]
fn unknown_documents_and_methods_are_errors() {
    let (mut client, _) = Client::start(json!({}));

    let response = client.request(
        lsp_types::request::SemanticTokensFullRequest::METHOD,
        json!({ "textDocument": { "uri": "file:///missing.lua" } }),
    );
    assert_eq!(response.error.unwrap().code, lsp_server::ErrorCode::InternalError as i32);

    let response = client.request("lunette/unknown", Value::Null);
    assert_eq!(response.error.unwrap().code, lsp_server::ErrorCode::MethodNotFound as i32);

    // Cancelling a request that already finished is harmless.
    client.notify(lsp_types::notification::Cancel::METHOD, json!({ "id": 1 }));
    client.shutdown();
}

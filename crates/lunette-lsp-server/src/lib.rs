//! Lua language server speaking LSP over stdio.

mod api;
mod in_flight;
mod notifications;
mod requests;
mod semantic_tokens;

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use lunette_ide::{Analysis, AnalysisSnapshot, Cancellation, Cancelled, File, PositionEncoding};
use rustc_hash::FxHashMap;

use crate::in_flight::InFlight;

/// Work finished on the thread pool, handed back to the main loop.
pub(crate) enum Task {
    Response(lsp_server::Response),
}

pub struct Server {
    connection: lsp_server::Connection,
    io_threads: Option<lsp_server::IoThreads>,
    analysis: Analysis,
    files: FxHashMap<lsp_types::Uri, File>,
    encoding: PositionEncoding,
    in_flight: InFlight,
    pool: threadpool::ThreadPool,
    task_sender: Sender<Task>,
    task_receiver: Receiver<Task>,
}

enum Event {
    Message(lsp_server::Message),
    Task(Task),
}

/// What a request running on the pool can see.
pub(crate) struct ServerSnapshot {
    analysis: AnalysisSnapshot,
    files: FxHashMap<lsp_types::Uri, File>,
    encoding: PositionEncoding,
    cancel: Cancellation,
}

impl ServerSnapshot {
    fn file(&self, uri: &lsp_types::Uri) -> Result<File> {
        self.files.get(uri).copied().ok_or_else(|| unknown_document(uri))
    }
}

impl Server {
    fn server_capabilities(encoding: PositionEncoding) -> lsp_types::ServerCapabilities {
        lsp_types::ServerCapabilities {
            position_encoding: Some(match encoding {
                PositionEncoding::Utf8 => lsp_types::PositionEncodingKind::UTF8,
                PositionEncoding::Utf16 => lsp_types::PositionEncodingKind::UTF16,
            }),
            diagnostic_provider: Some(lsp_types::DiagnosticServerCapabilities::Options(
                lsp_types::DiagnosticOptions {
                    identifier: Some(env!("CARGO_PKG_NAME").to_owned()),
                    ..Default::default()
                },
            )),
            text_document_sync: Some(lsp_types::TextDocumentSyncCapability::Kind(
                lsp_types::TextDocumentSyncKind::FULL,
            )),
            semantic_tokens_provider: Some(
                lsp_types::SemanticTokensOptions {
                    legend: semantic_tokens::legend(),
                    range: Some(true),
                    full: Some(lsp_types::SemanticTokensFullOptions::Bool(true)),
                    ..Default::default()
                }
                .into(),
            ),
            ..lsp_types::ServerCapabilities::default()
        }
    }

    /// The client's preferred encoding when it offers UTF-8, UTF-16 otherwise.
    fn negotiate_encoding(params: &lsp_types::InitializeParams) -> PositionEncoding {
        let offered = params
            .capabilities
            .general
            .as_ref()
            .and_then(|general| general.position_encodings.as_deref())
            .unwrap_or_default();
        if offered.contains(&lsp_types::PositionEncodingKind::UTF8) {
            PositionEncoding::Utf8
        } else {
            PositionEncoding::Utf16
        }
    }

    pub fn stdio() -> Result<Self> {
        let (connection, io_threads) = lsp_server::Connection::stdio();
        Self::initialize(connection, Some(io_threads))
    }

    /// Runs the initialize handshake on `connection`.
    pub fn initialize(
        connection: lsp_server::Connection,
        io_threads: Option<lsp_server::IoThreads>,
    ) -> Result<Self> {
        let (initialize_id, initialize_params) = match connection.initialize_start() {
            Ok(it) => it,
            Err(protocol_error) => {
                if protocol_error.channel_is_disconnected()
                    && let Some(io_threads) = io_threads
                {
                    io_threads.join()?;
                }
                return Err(protocol_error.into());
            }
        };

        let initialize_params: lsp_types::InitializeParams =
            from_json("InitializeParams", &initialize_params)?;
        let encoding = Self::negotiate_encoding(&initialize_params);

        let initialize_data = serde_json::json!({
            "capabilities": Self::server_capabilities(encoding),
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });

        if let Err(protocol_error) = connection.initialize_finish(initialize_id, initialize_data) {
            if protocol_error.channel_is_disconnected()
                && let Some(io_threads) = io_threads
            {
                io_threads.join()?;
            }
            return Err(protocol_error.into());
        }
        log::info!("initialized, position encoding {encoding:?}");

        let (task_sender, task_receiver) = crossbeam_channel::unbounded();
        Ok(Self {
            connection,
            io_threads,
            analysis: Analysis::default(),
            files: FxHashMap::default(),
            encoding,
            in_flight: InFlight::default(),
            pool: threadpool::Builder::new().thread_name("lunette-worker".to_owned()).build(),
            task_sender,
            task_receiver,
        })
    }

    fn file(&self, uri: &lsp_types::Uri) -> Result<File> {
        self.files.get(uri).copied().ok_or_else(|| unknown_document(uri))
    }

    fn respond(&mut self, response: lsp_server::Response) {
        if let Err(error) = self.connection.sender.send(response.into()) {
            log::error!("failed to send response: {error}");
        }
    }

    /// Snapshot for a request on the pool, cancellable under `id`.
    fn snapshot(&mut self, id: lsp_server::RequestId) -> ServerSnapshot {
        ServerSnapshot {
            analysis: self.analysis.snapshot(),
            files: self.files.clone(),
            encoding: self.encoding,
            cancel: self.in_flight.register(id),
        }
    }

    pub fn run(mut self) -> Result<()> {
        let receiver = self.connection.receiver.clone();
        let tasks = self.task_receiver.clone();

        loop {
            let event = crossbeam_channel::select! {
                recv(receiver) -> message => message.map(Event::Message),
                recv(tasks) -> task => task.map(Event::Task),
            };
            let Ok(event) = event else { break };

            match event {
                Event::Message(lsp_server::Message::Request(request)) => {
                    if self.connection.handle_shutdown(&request)? {
                        break;
                    }
                    api::request(&mut self, request);
                }
                Event::Message(lsp_server::Message::Response(_response)) => {}
                Event::Message(lsp_server::Message::Notification(notification)) => {
                    api::notification(&mut self, notification);
                }
                Event::Task(Task::Response(response)) => {
                    self.in_flight.complete(&response.id);
                    self.respond(response);
                }
            }
        }

        log::info!("shutting down");
        self.in_flight.cancel_all();
        self.pool.join();

        // The writer thread stops once every sender is gone.
        let Self { connection, io_threads, .. } = self;
        drop(connection);
        if let Some(io_threads) = io_threads {
            io_threads.join()?;
        }
        Ok(())
    }
}

fn unknown_document(uri: &lsp_types::Uri) -> anyhow::Error {
    anyhow::format_err!("unknown document {}", uri.as_str())
}

fn from_json<T: serde::de::DeserializeOwned>(
    what: &'static str,
    json: &serde_json::Value,
) -> Result<T> {
    serde_json::from_value(json.clone())
        .map_err(|e| anyhow::format_err!("Failed to deserialize {what}: {e}; {json}"))
}

fn result_to_response<R>(
    id: lsp_server::RequestId,
    result: Result<R::Result>,
) -> lsp_server::Response
where
    R: lsp_types::request::Request,
    R::Params: serde::de::DeserializeOwned,
    R::Result: serde::Serialize,
{
    match result {
        Ok(resp) => lsp_server::Response::new_ok(id, &resp),
        Err(error) if error.is::<Cancelled>() => {
            log::debug!("{} {id} was cancelled", R::METHOD);
            lsp_server::Response::new_err(
                id,
                lsp_server::ErrorCode::RequestCanceled as i32,
                error.to_string(),
            )
        }
        Err(error) => {
            log::error!("{} {id} failed: {error:#}", R::METHOD);
            lsp_server::Response::new_err(
                id,
                lsp_server::ErrorCode::InternalError as i32,
                error.to_string(),
            )
        }
    }
}

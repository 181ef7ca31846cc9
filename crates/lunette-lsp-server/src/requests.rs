use std::panic::AssertUnwindSafe;
use std::time::Instant;

use anyhow::Result;
use lunette_ide::Cancelled;

use crate::{Server, ServerSnapshot, Task};

pub(crate) struct RequestDispatcher<'me> {
    request: Option<lsp_server::Request>,
    server: &'me mut Server,
}

impl<'me> RequestDispatcher<'me> {
    pub(crate) fn new(request: lsp_server::Request, server: &'me mut Server) -> Self {
        Self { request: request.into(), server }
    }

    fn parse<R>(&mut self) -> Option<(lsp_server::Request, R::Params)>
    where
        R: lsp_types::request::Request,
    {
        let request = self.request.take_if(|request| request.method == R::METHOD)?;
        match crate::from_json(R::METHOD, &request.params) {
            Ok(params) => Some((request, params)),
            Err(error) => {
                self.server.respond(lsp_server::Response::new_err(
                    request.id,
                    lsp_server::ErrorCode::InvalidParams as i32,
                    error.to_string(),
                ));
                None
            }
        }
    }

    /// Handles `R` on the main loop with exclusive access to the server.
    pub(crate) fn on<R>(mut self, f: fn(&mut Server, R::Params) -> Result<R::Result>) -> Self
    where
        R: lsp_types::request::Request,
    {
        let Some((request, params)) = self.parse::<R>() else {
            return self;
        };

        let result = crate::result_to_response::<R>(request.id, f(self.server, params));
        self.server.respond(result);

        self
    }

    /// Handles `R` on the thread pool against a snapshot. The response comes
    /// back through the task channel.
    pub(crate) fn on_pool<R>(mut self, f: fn(ServerSnapshot, R::Params) -> Result<R::Result>) -> Self
    where
        R: lsp_types::request::Request + 'static,
        R::Params: Send,
    {
        let Some((request, params)) = self.parse::<R>() else {
            return self;
        };

        let snapshot = self.server.snapshot(request.id.clone());
        let sender = self.server.task_sender.clone();
        self.server.pool.execute(move || {
            let started = Instant::now();
            let result = salsa::Cancelled::catch(AssertUnwindSafe(|| f(snapshot, params)))
                .unwrap_or_else(|_| Err(Cancelled.into()));
            log::debug!("{} {} took {:?}", R::METHOD, request.id, started.elapsed());

            let response = crate::result_to_response::<R>(request.id, result);
            if sender.send(Task::Response(response)).is_err() {
                log::debug!("{} finished after the main loop exited", R::METHOD);
            }
        });

        self
    }

    pub(crate) fn finish(self) {
        if let Some(request) = self.request {
            log::warn!("unknown request: {}", request.method);
            self.server.respond(lsp_server::Response::new_err(
                request.id,
                lsp_server::ErrorCode::MethodNotFound as i32,
                "unknown request".to_owned(),
            ));
        }
    }
}

use lunette_ide::Cancellation;
use rustc_hash::FxHashMap;

/// Requests currently running on the pool, by id.
#[derive(Default)]
pub(crate) struct InFlight {
    requests: FxHashMap<lsp_server::RequestId, Cancellation>,
}

impl InFlight {
    pub(crate) fn register(&mut self, id: lsp_server::RequestId) -> Cancellation {
        let cancel = Cancellation::new();
        self.requests.insert(id, cancel.clone());
        cancel
    }

    pub(crate) fn complete(&mut self, id: &lsp_server::RequestId) {
        self.requests.remove(id);
    }

    /// Returns `false` when `id` is not running.
    pub(crate) fn cancel(&mut self, id: &lsp_server::RequestId) -> bool {
        self.requests.remove(id).inspect(Cancellation::cancel).is_some()
    }

    /// Cancels everything, before an edit invalidates what is running.
    pub(crate) fn cancel_all(&mut self) {
        for (_, cancel) in self.requests.drain() {
            cancel.cancel();
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.requests.len()
    }
}

use std::collections::hash_map::Entry;

use anyhow::Result;
use lunette_ide::File;
use lunette_ide::highlight::SpanMapper;
use salsa::Setter as _;
use text_size::{TextRange, TextSize};

use crate::notifications::NotificationDispatcher;
use crate::requests::RequestDispatcher;
use crate::{Server, ServerSnapshot, semantic_tokens};

pub(crate) fn request(server: &mut Server, request: lsp_server::Request) {
    RequestDispatcher::new(request, server)
        .on::<lsp_types::request::DocumentDiagnosticRequest>(handle_document_diagnostic)
        .on_pool::<lsp_types::request::SemanticTokensFullRequest>(handle_semantic_tokens_full)
        .on_pool::<lsp_types::request::SemanticTokensRangeRequest>(handle_semantic_tokens_range)
        .finish();
}

#[expect(clippy::needless_pass_by_value)]
fn handle_document_diagnostic(
    server: &mut Server,
    params: lsp_types::DocumentDiagnosticParams,
) -> Result<lsp_types::DocumentDiagnosticReportResult> {
    let file = server.file(&params.text_document.uri)?;
    let db = server.analysis.db();
    let mapper = SpanMapper::new(file.text(db), file.line_index(db), server.encoding);

    let diagnostics = server
        .analysis
        .diagnostics(file)
        .iter()
        .map(|diagnostic| {
            lsp_types::Diagnostic::new(
                to_lsp_range(mapper, diagnostic.range()),
                Some(lsp_types::DiagnosticSeverity::ERROR),
                None,
                Some("lunette".to_owned()),
                diagnostic.message().to_owned(),
                None,
                None,
            )
        })
        .collect();

    Ok(lsp_types::DocumentDiagnosticReport::Full(lsp_types::RelatedFullDocumentDiagnosticReport {
        related_documents: None,
        full_document_diagnostic_report: lsp_types::FullDocumentDiagnosticReport {
            result_id: None,
            items: diagnostics,
        },
    })
    .into())
}

#[expect(clippy::needless_pass_by_value)]
fn handle_semantic_tokens_full(
    snapshot: ServerSnapshot,
    params: lsp_types::SemanticTokensParams,
) -> Result<Option<lsp_types::SemanticTokensResult>> {
    let file = snapshot.file(&params.text_document.uri)?;
    let tokens =
        snapshot.analysis.semantic_tokens(file, None, snapshot.encoding, &snapshot.cancel)?;
    log::debug!("{} semantic tokens for {}", tokens.len(), params.text_document.uri.as_str());

    Ok(Some(
        lsp_types::SemanticTokens { result_id: None, data: semantic_tokens::encode(&tokens) }
            .into(),
    ))
}

#[expect(clippy::needless_pass_by_value)]
fn handle_semantic_tokens_range(
    snapshot: ServerSnapshot,
    params: lsp_types::SemanticTokensRangeParams,
) -> Result<Option<lsp_types::SemanticTokensRangeResult>> {
    let file = snapshot.file(&params.text_document.uri)?;
    let db = snapshot.analysis.db();
    let mapper = SpanMapper::new(file.text(db), file.line_index(db), snapshot.encoding);
    let range = from_lsp_range(mapper, file.text(db), params.range);

    let tokens =
        snapshot.analysis.semantic_tokens(file, Some(range), snapshot.encoding, &snapshot.cancel)?;

    Ok(Some(
        lsp_types::SemanticTokens { result_id: None, data: semantic_tokens::encode(&tokens) }
            .into(),
    ))
}

pub(crate) fn notification(server: &mut Server, notification: lsp_server::Notification) {
    NotificationDispatcher::new(notification, server)
        .on::<lsp_types::notification::DidOpenTextDocument>(handle_did_open_text_document)
        .on::<lsp_types::notification::DidChangeTextDocument>(handle_did_change_text_document)
        .on::<lsp_types::notification::DidCloseTextDocument>(handle_did_close_text_document)
        .on::<lsp_types::notification::Cancel>(handle_cancel)
        .finish();
}

fn handle_did_open_text_document(
    server: &mut Server,
    params: lsp_types::DidOpenTextDocumentParams,
) -> Result<()> {
    let lsp_types::TextDocumentItem { uri, language_id: _, version: _, text } =
        params.text_document;
    log::info!("opened {}", uri.as_str());

    match server.files.entry(uri) {
        Entry::Occupied(occupied) => {
            let file = *occupied.get();
            server.in_flight.cancel_all();
            file.set_text(server.analysis.db_mut()).to(text);
        }
        Entry::Vacant(vacant) => {
            let file = File::new(server.analysis.db(), vacant.key().path().as_str().into(), text);
            vacant.insert(file);
        }
    }

    Ok(())
}

fn handle_did_change_text_document(
    server: &mut Server,
    params: lsp_types::DidChangeTextDocumentParams,
) -> Result<()> {
    let file = server.file(&params.text_document.uri)?;
    // Full sync: the last change holds the whole document.
    let Some(change) = params.content_changes.into_iter().last() else {
        return Ok(());
    };

    server.in_flight.cancel_all();
    file.set_text(server.analysis.db_mut()).to(change.text);
    Ok(())
}

#[expect(clippy::needless_pass_by_value)]
fn handle_did_close_text_document(
    server: &mut Server,
    params: lsp_types::DidCloseTextDocumentParams,
) -> Result<()> {
    server.in_flight.cancel_all();
    server.files.remove(&params.text_document.uri);
    log::info!("closed {}", params.text_document.uri.as_str());
    Ok(())
}

fn handle_cancel(server: &mut Server, params: lsp_types::CancelParams) -> Result<()> {
    let id: lsp_server::RequestId = match params.id {
        lsp_types::NumberOrString::Number(id) => id.into(),
        lsp_types::NumberOrString::String(id) => id.into(),
    };

    if server.in_flight.cancel(&id) {
        log::debug!("cancelled request {id}");
    }
    Ok(())
}

fn to_lsp_range(mapper: SpanMapper<'_>, range: TextRange) -> lsp_types::Range {
    let (start_line, start_column) = mapper.position(range.start());
    let (end_line, end_column) = mapper.position(range.end());

    lsp_types::Range {
        start: lsp_types::Position::new(start_line, start_column),
        end: lsp_types::Position::new(end_line, end_column),
    }
}

/// Positions past the end of the text clamp to the end.
fn from_lsp_range(mapper: SpanMapper<'_>, text: &str, range: lsp_types::Range) -> TextRange {
    let offset = |position: lsp_types::Position| {
        mapper.offset(position.line, position.character).unwrap_or_else(|| TextSize::of(text))
    };
    let start = offset(range.start);
    let end = offset(range.end);
    TextRange::new(start, end.max(start))
}

#[cfg(test)]
mod tests {
    use lunette_ide::{LineIndex, PositionEncoding};

    use super::*;

    #[test]
    fn ranges_convert_both_ways() {
        let text = "local s = 'é'\nprint(s)\n";
        let line_index = LineIndex::new(text);
        let mapper = SpanMapper::new(text, &line_index, PositionEncoding::Utf16);

        let print = TextRange::new(TextSize::new(15), TextSize::new(20));
        let lsp = to_lsp_range(mapper, print);
        assert_eq!(
            lsp,
            lsp_types::Range::new(lsp_types::Position::new(1, 0), lsp_types::Position::new(1, 5))
        );
        assert_eq!(from_lsp_range(mapper, text, lsp), print);
    }

    #[test]
    fn out_of_bounds_ranges_clamp() {
        let text = "x = 1\n";
        let line_index = LineIndex::new(text);
        let mapper = SpanMapper::new(text, &line_index, PositionEncoding::Utf8);

        let range =
            lsp_types::Range::new(lsp_types::Position::new(0, 4), lsp_types::Position::new(40, 0));
        assert_eq!(
            from_lsp_range(mapper, text, range),
            TextRange::new(TextSize::new(4), TextSize::of(text))
        );
    }
}

//! Editor host for terminal runs: files become in-memory buffers, notices
//! go to stderr.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use jsstyle_config::{JsstyleConfig, LinterSettings};
use jsstyle_engine::{EditorHost, LinterProfile, OutputLevel, StatusView};
use jsstyle_lsp::LintDiagnostic;
use jsstyle_lsp::protocol::path_to_file_uri;
use jsstyle_types::{Position, TextDocument, TextEdit};

struct Buffer {
    path: PathBuf,
    document: TextDocument,
    text: String,
    dirty: bool,
}

pub struct HeadlessHost {
    config: JsstyleConfig,
    root: Option<PathBuf>,
    buffers: BTreeMap<String, Buffer>,
    active: Option<String>,
    diagnostics: BTreeMap<String, Vec<LintDiagnostic>>,
    output: Vec<(OutputLevel, String)>,
    reveal_output: bool,
}

impl HeadlessHost {
    pub fn new(config: JsstyleConfig, root: Option<PathBuf>) -> Self {
        Self {
            config,
            root,
            buffers: BTreeMap::new(),
            active: None,
            diagnostics: BTreeMap::new(),
            output: Vec::new(),
            reveal_output: false,
        }
    }

    /// Load a file into a buffer at version 1.
    pub fn open(&mut self, path: &Path) -> Result<TextDocument> {
        let path = std::path::absolute(path)
            .with_context(|| format!("resolving {}", path.display()))?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let uri = path_to_file_uri(&path)?.to_string();

        let document = TextDocument::new(uri.clone(), language_id(&path), 1);
        self.buffers.insert(
            uri,
            Buffer {
                path,
                document: document.clone(),
                text,
                dirty: false,
            },
        );
        Ok(document)
    }

    pub fn set_active(&mut self, uri: &str) {
        self.active = Some(uri.to_string());
    }

    pub fn close(&mut self, uri: &str) {
        self.buffers.remove(uri);
        self.diagnostics.remove(uri);
        if self.active.as_deref() == Some(uri) {
            self.active = None;
        }
    }

    pub fn diagnostics_for(&self, uri: &str) -> Option<&[LintDiagnostic]> {
        self.diagnostics.get(uri).map(Vec::as_slice)
    }

    /// Write a modified buffer back to its file. `false` if unchanged.
    pub fn save(&mut self, uri: &str) -> Result<bool> {
        let Some(buffer) = self.buffers.get_mut(uri) else {
            return Ok(false);
        };
        if !buffer.dirty {
            return Ok(false);
        }
        std::fs::write(&buffer.path, &buffer.text)
            .with_context(|| format!("writing {}", buffer.path.display()))?;
        buffer.dirty = false;
        Ok(true)
    }

    /// Print the output log if anything asked for it to be shown.
    pub fn flush_output(&self) {
        if !self.reveal_output {
            return;
        }
        for (_, line) in &self.output {
            eprintln!("{line}");
        }
    }
}

impl EditorHost for HeadlessHost {
    fn active_document(&self) -> Option<TextDocument> {
        let uri = self.active.as_ref()?;
        self.buffers.get(uri).map(|buffer| buffer.document.clone())
    }

    fn open_documents(&self) -> Vec<TextDocument> {
        self.buffers.values().map(|b| b.document.clone()).collect()
    }

    fn document_text(&self, uri: &str) -> Option<String> {
        self.buffers.get(uri).map(|b| b.text.clone())
    }

    fn workspace_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn settings(&self, profile: &LinterProfile) -> LinterSettings {
        self.config.section(profile.scope)
    }

    fn apply_edits(&mut self, uri: &str, edits: &[TextEdit]) -> bool {
        let Some(buffer) = self.buffers.get_mut(uri) else {
            return false;
        };
        let Some(text) = apply_text_edits(&buffer.text, edits) else {
            tracing::warn!("Rejecting edits for {uri}: ranges out of bounds or overlapping");
            return false;
        };
        if text != buffer.text {
            buffer.text = text;
            buffer.document.version += 1;
            buffer.dirty = true;
        }
        true
    }

    fn show_information(&mut self, message: &str) {
        eprintln!("info: {message}");
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }

    fn render_status(&mut self, view: &StatusView) {
        tracing::trace!(text = %view.text, visible = view.visible, "Status");
    }

    fn append_output(&mut self, level: OutputLevel, message: &str) {
        self.output.push((level, message.to_string()));
    }

    fn show_output(&mut self, _preserve_focus: bool) {
        self.reveal_output = true;
    }

    fn publish_diagnostics(&mut self, uri: &str, diagnostics: &[LintDiagnostic]) {
        if self.buffers.contains_key(uri) {
            self.diagnostics.insert(uri.to_string(), diagnostics.to_vec());
        }
    }
}

fn language_id(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("js" | "mjs" | "cjs") => "javascript",
        Some("jsx") => "javascriptreact",
        _ => "plaintext",
    }
}

/// Byte offset of an LSP position (UTF-16 columns). Columns past the end of
/// a line clamp to the line end.
fn offset_at(text: &str, position: Position) -> Option<usize> {
    let mut line_start = 0;
    for _ in 0..position.line {
        line_start += text[line_start..].find('\n')? + 1;
    }
    let line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |i| line_start + i);

    let mut units = 0u32;
    for (index, ch) in text[line_start..line_end].char_indices() {
        if units >= position.character {
            return Some(line_start + index);
        }
        units += ch.len_utf16() as u32;
    }
    Some(line_end)
}

/// Apply edits computed against `text`. `None` if any range is invalid or
/// two ranges overlap.
fn apply_text_edits(text: &str, edits: &[TextEdit]) -> Option<String> {
    let mut spans = edits
        .iter()
        .enumerate()
        .map(|(index, edit)| {
            let start = offset_at(text, edit.range.start)?;
            let end = offset_at(text, edit.range.end)?;
            (start <= end).then_some((start, end, index, edit.new_text.as_str()))
        })
        .collect::<Option<Vec<_>>>()?;

    // Back to front so earlier offsets stay valid. Inserts sharing an offset
    // go in reverse array order so they end up in array order.
    spans.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(b.2.cmp(&a.2)));
    if spans.windows(2).any(|pair| pair[1].1 > pair[0].0) {
        return None;
    }

    let mut result = text.to_string();
    for (start, end, _, new_text) in spans {
        result.replace_range(start..end, new_text);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsstyle_types::Range;

    fn edit(start: (u32, u32), end: (u32, u32), new_text: &str) -> TextEdit {
        TextEdit::replace(
            Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1)),
            new_text,
        )
    }

    #[test]
    fn offsets_count_utf16_units() {
        let text = "const s = '😀';\nx\n";
        // The emoji is two UTF-16 units and four bytes.
        assert_eq!(offset_at(text, Position::new(0, 11)), Some(11));
        assert_eq!(offset_at(text, Position::new(0, 13)), Some(15));
        assert_eq!(offset_at(text, Position::new(1, 0)), Some(text.find('x').unwrap()));
        assert_eq!(offset_at(text, Position::new(1, 99)), Some(text.len() - 1));
        assert_eq!(offset_at(text, Position::new(2, 0)), Some(text.len()));
        assert_eq!(offset_at(text, Position::new(3, 0)), None);
    }

    #[test]
    fn applies_multiple_edits() {
        let text = "var a = 1;\nvar b = 2;\n";
        let edits = [
            edit((0, 9), (0, 10), ""),
            edit((1, 9), (1, 10), ""),
            edit((0, 0), (0, 3), "let"),
        ];
        assert_eq!(
            apply_text_edits(text, &edits).as_deref(),
            Some("let a = 1\nvar b = 2\n")
        );
    }

    #[test]
    fn inserts_at_one_position_keep_their_order() {
        let edits = [
            edit((0, 0), (0, 0), "a"),
            edit((0, 0), (0, 0), "b"),
            edit((0, 1), (0, 1), ";"),
        ];
        assert_eq!(apply_text_edits("x", &edits).as_deref(), Some("abx;"));
    }

    #[test]
    fn rejects_overlap_and_out_of_range() {
        let text = "abcdef\n";
        assert_eq!(
            apply_text_edits(text, &[edit((0, 0), (0, 4), ""), edit((0, 2), (0, 5), "")]),
            None
        );
        assert_eq!(apply_text_edits(text, &[edit((5, 0), (5, 1), "")]), None);
        assert_eq!(apply_text_edits(text, &[edit((0, 3), (0, 1), "")]), None);
    }

    #[test]
    fn buffer_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.js");
        std::fs::write(&path, "var a = 1;\n").unwrap();

        let mut host = HeadlessHost::new(JsstyleConfig::default(), None);
        let document = host.open(&path).unwrap();
        assert_eq!(document.language_id, "javascript");
        host.set_active(&document.uri);
        assert_eq!(host.active_document(), Some(document.clone()));

        assert!(host.apply_edits(&document.uri, &[edit((0, 9), (0, 10), "")]));
        assert_eq!(host.active_document().unwrap().version, 2);
        assert!(host.save(&document.uri).unwrap());
        assert!(!host.save(&document.uri).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "var a = 1\n");

        host.close(&document.uri);
        assert_eq!(host.active_document(), None);
    }

    #[test]
    fn diagnostics_only_kept_for_open_buffers() {
        let mut host = HeadlessHost::new(JsstyleConfig::default(), None);
        host.publish_diagnostics("file:///nowhere.js", &[]);
        assert!(host.diagnostics_for("file:///nowhere.js").is_none());
    }

    #[test]
    fn languages_by_extension() {
        assert_eq!(language_id(Path::new("a.js")), "javascript");
        assert_eq!(language_id(Path::new("a.cjs")), "javascript");
        assert_eq!(language_id(Path::new("a.jsx")), "javascriptreact");
        assert_eq!(language_id(Path::new("a.ts")), "plaintext");
    }
}

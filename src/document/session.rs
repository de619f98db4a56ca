//! The document writer session: the one owner of page, cursor and font state.
//!
//! Callers express intent ("a bold header line", "a wrapped paragraph") and
//! the session does the layout: font switching, line placement, wrapping and
//! automatic page breaks at the bottom margin. All operations append; nothing
//! already placed is ever moved or edited.
//!
//! Units are millimetres with the origin at the top-left of the page, fonts
//! are sized in points. The vertical rhythm is fixed:
//!
//! | Operation                    | Font        | Line | Gap after |
//! |------------------------------|-------------|------|-----------|
//! | `write_title`                | bold 16     | 10   | 10        |
//! | `write_section_header`       | bold 14     | 10   | 5         |
//! | `write_conversation_header`  | bold 12     | 10   | 5         |
//! | `write_speaker_header`       | bold 11     | 8    | 0         |
//! | `write_paragraph`            | regular 11  | 8    | 3         |
//! | `embed_image`                | n/a         | box  | 10        |

use super::metrics::{self, size_mm};
use super::{Block, Document, DocumentRenderer, Font, Page, PageItem};
use crate::config::PageLayout;
use crate::error::ExportError;
use std::path::Path;
use tracing::debug;

const DEFAULT_FONT: Font = Font::regular(12.0);
const TITLE_FONT: Font = Font::bold(16.0);
const SECTION_FONT: Font = Font::bold(14.0);
const CONVERSATION_FONT: Font = Font::bold(12.0);
const SPEAKER_FONT: Font = Font::bold(11.0);
const BODY_FONT: Font = Font::regular(11.0);

const HEADER_LINE: f32 = 10.0;
const BODY_LINE: f32 = 8.0;

const TITLE_GAP: f32 = 10.0;
const HEADER_GAP: f32 = 5.0;
const PARAGRAPH_GAP: f32 = 3.0;
const IMAGE_GAP: f32 = 10.0;

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
}

/// Owns the single document being built during one export run.
#[derive(Debug)]
pub struct DocumentSession {
    layout: PageLayout,
    document: Document,
    /// Cursor: distance from the top edge of the current page.
    y: f32,
    font: Font,
}

impl DocumentSession {
    /// Start a document: page 1, default body font, automatic page breaks at
    /// `layout.bottom_margin` from the bottom edge.
    pub fn begin(layout: PageLayout) -> Self {
        let document = Document {
            page_width: layout.page_width,
            page_height: layout.page_height,
            pages: vec![Page::default()],
            blocks: Vec::new(),
        };
        Self {
            y: layout.margin,
            layout,
            document,
            font: DEFAULT_FONT,
        }
    }

    /// Bold, large, centred across the content width.
    pub fn write_title(&mut self, text: &str) {
        self.font = TITLE_FONT;
        self.write_line(text, HEADER_LINE, Align::Center);
        self.advance(TITLE_GAP);
        self.document.blocks.push(Block::Title(text.to_string()));
    }

    /// Start a new page and write a bold section header at its top.
    pub fn write_section_header(&mut self, text: &str) {
        self.new_page();
        self.font = SECTION_FONT;
        self.write_line(text, HEADER_LINE, Align::Left);
        self.advance(HEADER_GAP);
        self.document
            .blocks
            .push(Block::SectionHeader(text.to_string()));
    }

    /// Bold line naming a conversation.
    pub fn write_conversation_header(&mut self, label: &str) {
        self.font = CONVERSATION_FONT;
        self.write_line(label, HEADER_LINE, Align::Left);
        self.advance(HEADER_GAP);
        self.document
            .blocks
            .push(Block::ConversationHeader(label.to_string()));
    }

    /// Bold `"{author} ({timestamp}):"` line, or `"{author}:"` without a
    /// timestamp.
    pub fn write_speaker_header(&mut self, author: &str, timestamp: Option<&str>) {
        let line = match timestamp {
            Some(ts) => format!("{author} ({ts}):"),
            None => format!("{author}:"),
        };
        self.font = SPEAKER_FONT;
        self.write_line(&line, BODY_LINE, Align::Left);
        self.document.blocks.push(Block::SpeakerHeader(line));
    }

    /// Regular-weight block wrapped to the content width.
    pub fn write_paragraph(&mut self, text: &str) {
        self.font = BODY_FONT;
        let max_width = self.layout.content_width() - 2.0 * self.layout.cell_margin;
        let lines = metrics::wrap_text(text, self.font, max_width);
        debug!("Paragraph: {} chars → {} lines", text.len(), lines.len());
        for line in &lines {
            self.write_line(line, BODY_LINE, Align::Left);
        }
        self.advance(PARAGRAPH_GAP);
        self.document.blocks.push(Block::Paragraph(text.to_string()));
    }

    /// Place an image box with its top-left corner at (`x`, cursor). Breaks
    /// the page first when the box would cross the bottom margin.
    pub fn embed_image(&mut self, path: &Path, x: f32, width: f32, height: f32) {
        self.ensure_room(height);
        self.place(PageItem::Image {
            x,
            top: self.y,
            width,
            height,
            path: path.to_path_buf(),
        });
        self.y += height;
        self.advance(IMAGE_GAP);
        self.document.blocks.push(Block::Image {
            path: path.to_path_buf(),
            width,
            height,
        });
    }

    /// Pages so far, including the current one.
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// The page geometry this session lays out against.
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Read-only view of everything written so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// End the session without writing anything.
    pub fn finish(self) -> Document {
        self.document
    }

    /// Serialise the document to `output` through `renderer`.
    pub fn flush(
        self,
        output: &Path,
        renderer: &dyn DocumentRenderer,
    ) -> Result<Document, ExportError> {
        debug!(
            "Flushing {} pages to {}",
            self.document.page_count(),
            output.display()
        );
        renderer.render(&self.document, output)?;
        Ok(self.document)
    }

    // ── Layout internals ─────────────────────────────────────────────────

    fn new_page(&mut self) {
        self.document.pages.push(Page::default());
        self.y = self.layout.margin;
    }

    /// Break the page if a block of `height` would cross the trigger line.
    fn ensure_room(&mut self, height: f32) {
        if self.y + height > self.layout.break_trigger() {
            self.new_page();
        }
    }

    /// Vertical gap; never triggers a break on its own.
    fn advance(&mut self, gap: f32) {
        self.y += gap;
    }

    fn write_line(&mut self, text: &str, height: f32, align: Align) {
        self.ensure_room(height);
        if !text.is_empty() {
            let x = match align {
                Align::Left => self.layout.margin + self.layout.cell_margin,
                Align::Center => {
                    let free = self.layout.content_width() - metrics::text_width(text, self.font);
                    self.layout.margin + free / 2.0
                }
            };
            let baseline = self.y + 0.5 * height + 0.3 * size_mm(self.font);
            self.place(PageItem::Text {
                x,
                baseline,
                text: text.to_string(),
                font: self.font,
            });
        }
        self.y += height;
    }

    /// `begin` opens page 1 and pages are never removed, so a last page exists.
    fn place(&mut self, item: PageItem) {
        if let Some(page) = self.document.pages.last_mut() {
            page.items.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FontStyle;

    fn session() -> DocumentSession {
        DocumentSession::begin(PageLayout::default())
    }

    fn texts(doc: &Document) -> Vec<&str> {
        doc.text_lines().collect()
    }

    #[test]
    fn begins_with_one_empty_page() {
        let s = session();
        assert_eq!(s.page_count(), 1);
        assert!(s.document().pages[0].items.is_empty());
        assert!(s.document().blocks.is_empty());
    }

    #[test]
    fn title_is_bold_and_centred() {
        let mut s = session();
        s.write_title("Export");
        let doc = s.finish();
        match &doc.pages[0].items[0] {
            PageItem::Text { x, text, font, .. } => {
                assert_eq!(text, "Export");
                assert_eq!(font.style, FontStyle::Bold);
                assert_eq!(font.size_pt, 16.0);
                let w = metrics::text_width("Export", *font);
                let centre = x + w / 2.0;
                assert!((centre - 105.0).abs() < 1e-3, "centre at {centre}");
            }
            other => panic!("unexpected item {other:?}"),
        }
        assert_eq!(doc.blocks, vec![Block::Title("Export".into())]);
    }

    #[test]
    fn speaker_header_formats() {
        let mut s = session();
        s.write_speaker_header("User", Some("Unknown Time"));
        s.write_speaker_header("ChatGPT", None);
        let doc = s.finish();
        assert_eq!(texts(&doc), vec!["User (Unknown Time):", "ChatGPT:"]);
    }

    #[test]
    fn section_header_starts_new_page() {
        let mut s = session();
        s.write_title("T");
        s.write_section_header("Chat HTML Export");
        assert_eq!(s.page_count(), 2);
        let doc = s.finish();
        match &doc.pages[1].items[0] {
            PageItem::Text { text, baseline, .. } => {
                assert_eq!(text, "Chat HTML Export");
                assert!(*baseline < 20.0, "header should sit at the top: {baseline}");
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn empty_paragraph_records_block_without_text_item() {
        let mut s = session();
        s.write_paragraph("");
        let doc = s.finish();
        assert!(doc.pages[0].items.is_empty());
        assert_eq!(doc.blocks, vec![Block::Paragraph(String::new())]);
    }

    #[test]
    fn long_paragraph_breaks_pages() {
        let mut s = session();
        let text = (0..100).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        s.write_paragraph(&text);
        // 272 mm usable / 8 mm per line → 34 lines per page.
        assert_eq!(s.page_count(), 3);
        let doc = s.finish();
        assert_eq!(doc.text_lines().count(), 100);
        for page in &doc.pages {
            for item in &page.items {
                if let PageItem::Text { baseline, .. } = item {
                    assert!(*baseline < 282.0, "text below trigger: {baseline}");
                }
            }
        }
    }

    #[test]
    fn image_breaks_page_when_it_does_not_fit() {
        let mut s = session();
        s.embed_image(Path::new("a.png"), 10.0, 180.0, 200.0);
        assert_eq!(s.page_count(), 1);
        s.embed_image(Path::new("b.png"), 10.0, 180.0, 200.0);
        assert_eq!(s.page_count(), 2);
        let doc = s.finish();
        match &doc.pages[1].items[0] {
            PageItem::Image { top, height, .. } => {
                assert_eq!(*top, 10.0);
                assert_eq!(*height, 200.0);
            }
            other => panic!("unexpected item {other:?}"),
        }
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn operations_only_append() {
        let mut s = session();
        s.write_title("T");
        let before = s.document().pages[0].items.clone();
        s.write_conversation_header("Conversation 1");
        s.write_paragraph("body");
        let after = &s.document().pages[0].items;
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.len(), before.len() + 2);
    }

    struct FailingRenderer;

    impl DocumentRenderer for FailingRenderer {
        fn render(&self, _document: &Document, output: &Path) -> Result<(), ExportError> {
            Err(ExportError::OutputWriteFailed {
                path: output.to_path_buf(),
                detail: "disk full".into(),
            })
        }
    }

    #[test]
    fn flush_propagates_renderer_error() {
        let s = session();
        let err = s.flush(Path::new("out.pdf"), &FailingRenderer).unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }
}

//! PDF rendering of chat answers — plain Helvetica text, auto-paginated.
//!
//! Failure contract: any internal error yields `None`, never a panic or a
//! propagated error. The caller shows a generic failure message.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::warn;

/// Default filename offered for the exported document.
pub const DOWNLOAD_FILENAME: &str = "chat_response.pdf";

const PAGE_WIDTH: i64 = 595; // A4, in points
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 42; // 15 mm page-break margin
const LINE_HEIGHT: i64 = 28; // 10 mm paragraph cell height
const FONT_SIZE: i64 = 12;
// Usable width divided by the mean Helvetica advance at 12 pt.
const CHARS_PER_LINE: usize = 85;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LINE_HEIGHT) as usize;

/// Render `text` as a paginated PDF. Each input line becomes one wrapped
/// paragraph cell; a page break is inserted when content would cross the
/// bottom margin. Returns `None` on any internal failure.
pub fn render_document(text: &str) -> Option<Vec<u8>> {
    match try_render(text) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("PDF rendering failed: {}", e);
            None
        }
    }
}

fn try_render(text: &str) -> lopdf::Result<Vec<u8>> {
    let lines = wrap_lines(text, CHARS_PER_LINE);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids: Vec<Object> = Vec::new();
    for chunk in lines.chunks(LINES_PER_PAGE) {
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LINE_HEIGHT.into()]),
            Operation::new(
                "Td",
                vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - LINE_HEIGHT).into()],
            ),
        ];
        for (i, line) in chunk.iter().enumerate() {
            if i > 0 {
                ops.push(Operation::new("T*", vec![]));
            }
            ops.push(Operation::new("Tj", vec![Object::string_literal(latin1(line))]));
        }
        ops.push(Operation::new("ET", vec![]));

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id.into());
    }

    let page_count = page_ids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// Split on line breaks, then wrap each line to `max` characters on word
/// boundaries (hard-splitting words longer than a line). Always yields at
/// least one line so empty input still produces a page.
fn wrap_lines(text: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.split('\n') {
        if line.chars().count() <= max {
            out.push(line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in line.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + word_len > max {
                out.push(std::mem::take(&mut current));
            }
            if word_len > max {
                // No break point inside the word: hard-split it.
                for piece in chunk_chars(word, max) {
                    out.push(piece);
                }
                continue;
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    out
}

fn chunk_chars(word: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}

/// The built-in Type1 Helvetica only covers Latin-1; anything outside it is
/// replaced rather than failing the whole render.
fn latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
        .collect()
}

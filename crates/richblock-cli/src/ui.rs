use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{self, Borders, Paragraph},
};
use richblock_engine::dispatch::{is_block_of_type, is_mark_active};
use richblock_engine::{Block, BlockType, Command, DocumentEngine, Mark, Marks, Node, Path};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, LastAction, TOOLBAR};

/// Prefix and style for a block type
fn element_style(kind: BlockType) -> (&'static str, Style) {
    match kind {
        BlockType::Paragraph => ("", Style::default()),
        BlockType::Heading => (
            "# ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        BlockType::Code => ("│ ", Style::default().fg(Color::Green)),
        BlockType::List => ("• ", Style::default()),
    }
}

fn leaf_style(marks: &Marks) -> Style {
    marks.iter().fold(Style::default(), |style, mark| {
        style.add_modifier(match mark {
            Mark::Bold => Modifier::BOLD,
            Mark::Italic => Modifier::ITALIC,
            Mark::Underline => Modifier::UNDERLINED,
        })
    })
}

/// Rendered document lines plus the caret's (column, line), if it is visible
pub struct DocumentView {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<(u16, u16)>,
}

pub fn document_view(app: &App) -> DocumentView {
    let document = app.editor.document();
    let focus = app.editor.focus();
    let mut view = DocumentView {
        lines: Vec::new(),
        cursor: None,
    };

    let focus = focus.map(|point| (&point.path, point.offset));
    for (index, block) in document.blocks.iter().enumerate() {
        push_block(&mut view, block, Path::from([index]), 0, focus, None);
    }

    if document.is_blank()
        && let Some(first) = view.lines.first_mut()
    {
        first.spans.push(Span::styled(
            app.placeholder.clone(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
    }
    view
}

/// Render `block` and its nested blocks. `lead` is the prefix of a text-less
/// ancestor still waiting for a line to sit on.
fn push_block(
    view: &mut DocumentView,
    block: &Block,
    path: Path,
    depth: usize,
    focus: Option<(&Path, usize)>,
    mut lead: Option<(&'static str, Style)>,
) {
    let (prefix, block_style) = element_style(block.kind);
    let indent = "  ".repeat(depth);

    if block.holds_text() {
        let mut spans = Vec::new();
        if !indent.is_empty() {
            spans.push(Span::raw(indent.clone()));
        }
        let mut column = indent.width();
        if let Some((lead_prefix, lead_style)) = lead.take() {
            spans.push(Span::styled(lead_prefix, lead_style));
            column += lead_prefix.width();
        }
        spans.push(Span::styled(prefix, block_style));
        column += prefix.width();

        for (index, child) in block.children.iter().enumerate() {
            let Node::Text(run) = child else {
                continue;
            };
            if let Some((focus_path, offset)) = focus
                && *focus_path == path.child(index)
            {
                let before: String = run.text.chars().take(offset).collect();
                view.cursor = Some(((column + before.width()) as u16, view.lines.len() as u16));
            }
            column += run.text.width();
            spans.push(Span::styled(run.text.clone(), block_style.patch(leaf_style(&run.marks))));
        }
        view.lines.push(Line::from(spans));
    } else if lead.is_none() && !prefix.is_empty() {
        lead = Some((prefix, block_style));
    }

    for (index, child) in block.children.iter().enumerate() {
        if let Node::Block(nested) = child {
            push_block(view, nested, path.child(index), depth + 1, focus, lead.take());
        }
    }
}

fn toolbar_line(app: &App) -> Line<'static> {
    let selection = app.editor.selection();
    let document = app.editor.document();
    let mut spans = Vec::new();
    for (index, (label, command)) in TOOLBAR.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        let active = selection.is_some_and(|selection| match command {
            Command::ToggleMark(mark) => is_mark_active(document, selection, *mark),
            Command::ToggleBlock(kind) | Command::SetBlockType(kind) => {
                is_block_of_type(document, selection, *kind)
            }
            Command::InsertBlock => false,
        });
        let style = if active {
            Style::default().bg(Color::Yellow).fg(Color::Black)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        };
        spans.push(Span::styled(format!(" {label} "), style));
    }
    Line::from(spans)
}

fn status_line(app: &App) -> Line<'static> {
    let block = app
        .editor
        .block_type_at_focus()
        .map(|kind| kind.to_string())
        .unwrap_or_else(|| "-".to_string());
    let marks: Vec<String> = app.editor.marks_at_focus().iter().map(|mark| mark.to_string()).collect();
    let marks = if marks.is_empty() {
        "none".to_string()
    } else {
        marks.join(", ")
    };
    let last = match app.last_action {
        Some(LastAction::Key(event, dispatch)) => format!("{event}: {dispatch}"),
        Some(LastAction::Toolbar(command, Some(request))) => format!("{command}: {request}"),
        Some(LastAction::Toolbar(command, None)) => format!("{command}: no selection"),
        None => String::new(),
    };
    Line::from(vec![
        Span::styled(format!("{block} | marks: {marks}"), Style::default().fg(Color::Cyan)),
        Span::raw(" | "),
        Span::raw(last),
    ])
}

fn help_line(app: &App) -> Line<'static> {
    let mut text = String::from("Esc/ctrl+q: Quit | Enter: New block");
    for (keystroke, command) in app.dispatcher.keymap().bindings() {
        text.push_str(&format!(" | {keystroke}: {command}"));
    }
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

/// Draw the whole screen and remember where the toolbar went
pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    app.toolbar_area = chunks[0];
    f.render_widget(Paragraph::new(toolbar_line(app)), chunks[0]);

    let view = document_view(app);
    let content = Paragraph::new(view.lines)
        .block(widgets::Block::default().borders(Borders::ALL).title("richblock"));
    f.render_widget(content, chunks[1]);

    let inner = Rect {
        x: chunks[1].x + 1,
        y: chunks[1].y + 1,
        width: chunks[1].width.saturating_sub(2),
        height: chunks[1].height.saturating_sub(2),
    };
    if let Some((column, line)) = view.cursor
        && column < inner.width
        && line < inner.height
    {
        f.set_cursor_position((inner.x + column, inner.y + line));
    }

    f.render_widget(Paragraph::new(status_line(app)), chunks[2]);
    f.render_widget(Paragraph::new(help_line(app)), chunks[3]);
}

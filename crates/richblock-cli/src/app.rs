use ratatui::layout::Rect;
use richblock_config::Config;
use richblock_engine::{
    BlockType, Command, Dispatch, Dispatcher, Editor, Key, KeyEvent, Mark, TransformRequest,
};

/// Toolbar buttons, left to right
pub const TOOLBAR: [(&str, Command); 3] = [
    ("Bold", Command::ToggleMark(Mark::Bold)),
    ("Code Block", Command::ToggleBlock(BlockType::Code)),
    ("List", Command::ToggleBlock(BlockType::List)),
];

/// What the status line reports about the last input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastAction {
    Key(KeyEvent, Dispatch),
    Toolbar(Command, Option<TransformRequest>),
}

pub struct App {
    pub editor: Editor,
    pub dispatcher: Dispatcher,
    pub placeholder: String,
    pub last_action: Option<LastAction>,
    /// Where the toolbar was drawn last frame, for mouse hit-testing
    pub toolbar_area: Rect,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut editor = Editor::new(config.document())?;
        editor.select_start();
        Ok(Self {
            editor,
            dispatcher: config.dispatcher(),
            placeholder: config.placeholder.clone(),
            last_action: None,
            toolbar_area: Rect::default(),
            should_quit: false,
        })
    }

    /// Route a key: quit keys first, then the dispatcher, then the engine's
    /// default behaviour unless the dispatcher suppressed it
    pub fn on_key(&mut self, event: KeyEvent) {
        if event.key == Key::Escape || (event.modifiers.ctrl() && event.key == Key::Char('q')) {
            self.should_quit = true;
            return;
        }

        let dispatch = self.dispatcher.on_key_down(&mut self.editor, &event);
        if !dispatch.suppress_default && !self.editor.apply_default_key(&event) {
            log::debug!("no default handling for {event}");
        }
        self.last_action = Some(LastAction::Key(event, dispatch));
    }

    /// Left click at a terminal cell. Only toolbar buttons react.
    pub fn on_click(&mut self, column: u16, row: u16) {
        if let Some(command) = toolbar_button_at(self.toolbar_area, column, row) {
            let request = self.dispatcher.run_command(&mut self.editor, command);
            self.last_action = Some(LastAction::Toolbar(command, request));
        }
    }
}

/// Column span of each toolbar button when drawn from `x`. Buttons are
/// rendered as " Label " with one cell between them.
pub fn toolbar_layout(x: u16) -> Vec<(u16, u16, Command)> {
    let mut start = x;
    TOOLBAR
        .iter()
        .map(|(label, command)| {
            let width = label.chars().count() as u16 + 2;
            let span = (start, start + width, *command);
            start += width + 1;
            span
        })
        .collect()
}

pub fn toolbar_button_at(area: Rect, column: u16, row: u16) -> Option<Command> {
    if row != area.y || area.width == 0 {
        return None;
    }
    toolbar_layout(area.x)
        .into_iter()
        .find(|(start, end, _)| column >= *start && column < *end && column < area.x + area.width)
        .map(|(_, _, command)| command)
}

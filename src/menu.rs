//! Menu state machine.
//!
//! Every list screen is described by its title and item table; Up/Down step
//! through the table with wrap-around and Select runs the screen's commit
//! action. The length editor is the one screen without a list: Up/Down edit
//! the setting directly.

use crate::display::Frame;
use crate::input::Button;
use crate::settings::{Complexity, Settings};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Generating,
    LengthEditor,
    ComplexityEditor,
    About,
}

const MAIN_ITEMS: &[&str] = &["Generate", "Set Length", "Set Complexity", "About"];

const COMPLEXITY_ITEMS: &[&str] = &[
    "Numbers",
    "Lowercase",
    "Uppercase",
    "Letters",
    "Alphanumeric",
    "All symbols",
];

const ABOUT_ITEMS: &[&str] = &["Back", "Generate", "Length", "Complexity", "Host link"];

const ABOUT_HELP: &[[&str; 3]] = &[
    ["", "", ""],
    ["Shake the device", "while it works.", "About 3 seconds."],
    ["Password length", "8 to 64 chars.", "Select = OK"],
    ["Character set", "for the host:", ""],
    ["Serial 9600 8N1", "One line a key:", "LEN,COMPLEX,KEY"],
];

// Row of ABOUT_HELP that shows the current alphabet.
const COMPLEXITY_TOPIC: usize = 3;

impl Screen {
    fn title(self) -> &'static str {
        match self {
            Screen::MainMenu => "GATEKEY",
            Screen::Generating => "Generate",
            Screen::LengthEditor => "Password length",
            Screen::ComplexityEditor => "Complexity",
            Screen::About => "About",
        }
    }

    fn items(self) -> &'static [&'static str] {
        match self {
            Screen::MainMenu => MAIN_ITEMS,
            Screen::ComplexityEditor => COMPLEXITY_ITEMS,
            Screen::About => ABOUT_ITEMS,
            Screen::Generating | Screen::LengthEditor => &[""],
        }
    }

    pub fn item_count(self) -> usize {
        self.items().len()
    }

    // Main menu row that opens this screen.
    fn main_index(self) -> usize {
        match self {
            Screen::MainMenu | Screen::Generating => 0,
            Screen::LengthEditor => 1,
            Screen::ComplexityEditor => 2,
            Screen::About => 3,
        }
    }
}

/// What the caller has to do after a button was handled
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Generate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub screen: Screen,
    pub selector: usize,
    pub scroll: usize,
    /// About topic whose help text is up
    pub help: Option<usize>,
}

pub struct Menu {
    state: MenuState,
    visible: usize,
}

impl Menu {
    pub fn new(visible_lines: usize) -> Self {
        Menu {
            state: MenuState {
                screen: Screen::MainMenu,
                selector: 0,
                scroll: 0,
                help: None,
            },
            visible: visible_lines.max(1),
        }
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn handle(&mut self, button: Button, settings: &mut Settings) -> Action {
        if self.state.help.take().is_some() {
            return Action::None;
        }

        match (self.state.screen, button) {
            (Screen::LengthEditor, Button::Up) => settings.increment_len(),
            (Screen::LengthEditor, Button::Down) => settings.decrement_len(),
            (_, Button::Up) => self.step(false),
            (_, Button::Down) => self.step(true),
            (_, Button::Select) => return self.select(settings),
        }
        Action::None
    }

    /// Switch to the generating screen; the caller runs the pipeline and
    /// then calls [`Menu::finish_generation`].
    pub fn begin_generation(&mut self) {
        self.open(Screen::Generating, 0);
    }

    pub fn finish_generation(&mut self) {
        self.back_to_main();
    }

    fn select(&mut self, settings: &mut Settings) -> Action {
        let selector = self.state.selector;
        match self.state.screen {
            Screen::MainMenu => match selector {
                0 => return Action::Generate,
                1 => self.open(Screen::LengthEditor, 0),
                2 => self.open(Screen::ComplexityEditor, settings.complexity.index()),
                _ => self.open(Screen::About, 0),
            },
            Screen::LengthEditor | Screen::Generating => self.back_to_main(),
            Screen::ComplexityEditor => {
                settings.complexity = Complexity::from_index(selector);
                self.back_to_main();
            }
            Screen::About if selector == 0 => self.back_to_main(),
            Screen::About => self.state.help = Some(selector),
        }
        Action::None
    }

    fn step(&mut self, forward: bool) {
        let count = self.state.screen.item_count();
        self.state.selector = if forward {
            (self.state.selector + 1) % count
        } else {
            (self.state.selector + count - 1) % count
        };
        self.scroll_to_selector();
    }

    fn open(&mut self, screen: Screen, selector: usize) {
        self.state.screen = screen;
        self.state.selector = selector % screen.item_count();
        self.state.scroll = 0;
        self.state.help = None;
        self.scroll_to_selector();
    }

    fn back_to_main(&mut self) {
        let from = self.state.screen;
        self.open(Screen::MainMenu, from.main_index());
    }

    fn scroll_to_selector(&mut self) {
        let s = &mut self.state;
        if s.selector < s.scroll {
            s.scroll = s.selector;
        } else if s.selector >= s.scroll + self.visible {
            s.scroll = s.selector + 1 - self.visible;
        }
    }

    pub fn render(&self, settings: &Settings, frame: &mut Frame) {
        let s = &self.state;
        *frame = Frame::new();
        frame.line(0, s.screen.title());

        if let Some(topic) = s.help {
            for (row, text) in ABOUT_HELP[topic].iter().enumerate() {
                frame.line(row + 1, text);
            }
            if topic == COMPLEXITY_TOPIC {
                frame.line(3, settings.complexity.summary());
            }
            return;
        }

        match s.screen {
            Screen::LengthEditor => {
                frame.line_fmt(2, format_args!("     < {:2} >", settings.password_len()));
            }
            Screen::Generating => {}
            screen => {
                let items = screen.items();
                let rows = items.iter().enumerate().skip(s.scroll).take(self.visible);
                for (row, (i, item)) in rows.enumerate() {
                    let marker = if i == s.selector { '>' } else { ' ' };
                    let current = screen == Screen::ComplexityEditor && i == settings.complexity.index();
                    let tail = if current { " *" } else { "" };
                    frame.line_fmt(row + 1, format_args!("{}{}{}", marker, item, tail));
                }
            }
        }
    }
}

/// Progress of a generation, for the status frame
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Working,
    Done,
    Failed,
}

pub fn render_status(status: Status, frame: &mut Frame) {
    *frame = Frame::new();
    frame.line(0, Screen::Generating.title());
    match status {
        Status::Working => frame.line(1, "Working...").line(2, "Keep shaking"),
        Status::Done => frame.line(1, "Done.").line(2, "Key sent to host"),
        Status::Failed => frame.line(1, "Failed.").line(2, "Nothing sent"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn press(menu: &mut Menu, settings: &mut Settings, buttons: &[Button]) -> Action {
        let mut last = Action::None;
        for &b in buttons {
            last = menu.handle(b, settings);
        }
        last
    }

    fn invariant_holds(menu: &Menu) -> bool {
        let s = menu.state();
        s.selector < s.screen.item_count() && s.scroll <= s.selector && s.selector < s.scroll + menu.visible
    }

    #[test]
    fn main_menu_wraps() {
        let mut menu = Menu::new(3);
        let mut settings = Settings::default();
        menu.handle(Button::Up, &mut settings);
        assert_eq!(menu.state().selector, 3);
        assert_eq!(menu.state().scroll, 1);
        menu.handle(Button::Down, &mut settings);
        assert_eq!(menu.state().selector, 0);
        assert_eq!(menu.state().scroll, 0);
    }

    #[test]
    fn select_generate_asks_caller() {
        let mut menu = Menu::new(3);
        let mut settings = Settings::default();
        assert_eq!(menu.handle(Button::Select, &mut settings), Action::Generate);
        menu.begin_generation();
        assert_eq!(menu.state().screen, Screen::Generating);
        menu.finish_generation();
        assert_eq!(menu.state().screen, Screen::MainMenu);
        assert_eq!(menu.state().selector, 0);
    }

    #[test]
    fn length_editor_edits_and_returns() {
        let mut menu = Menu::new(3);
        let mut settings = Settings::default();
        press(&mut menu, &mut settings, &[Button::Down, Button::Select]);
        assert_eq!(menu.state().screen, Screen::LengthEditor);

        press(&mut menu, &mut settings, &[Button::Up; 100]);
        assert_eq!(settings.password_len(), 64);
        press(&mut menu, &mut settings, &[Button::Down; 100]);
        assert_eq!(settings.password_len(), 8);
        press(&mut menu, &mut settings, &[Button::Up, Button::Up, Button::Select]);

        assert_eq!(settings.password_len(), 10);
        assert_eq!(menu.state().screen, Screen::MainMenu);
        assert_eq!(menu.state().selector, 1);
    }

    #[test]
    fn complexity_commits_only_on_select() {
        let mut menu = Menu::new(3);
        let mut settings = Settings::default();
        press(&mut menu, &mut settings, &[Button::Down, Button::Down, Button::Select]);
        assert_eq!(menu.state().screen, Screen::ComplexityEditor);
        assert_eq!(menu.state().selector, Complexity::AllSymbols.index());

        // 5 -> 0 -> 1
        press(&mut menu, &mut settings, &[Button::Down, Button::Down]);
        assert_eq!(settings.complexity, Complexity::AllSymbols);
        menu.handle(Button::Select, &mut settings);
        assert_eq!(settings.complexity, Complexity::Lowercase);
        assert_eq!(menu.state().screen, Screen::MainMenu);
        assert_eq!(menu.state().selector, 2);
    }

    #[test]
    fn complexity_wraps_backwards() {
        let mut menu = Menu::new(3);
        let mut settings = Settings::new(16, Complexity::Numbers);
        press(&mut menu, &mut settings, &[Button::Down, Button::Down, Button::Select, Button::Up, Button::Select]);
        assert_eq!(settings.complexity, Complexity::AllSymbols);
    }

    #[test]
    fn about_help_dismissed_by_any_button() {
        let mut menu = Menu::new(3);
        let mut settings = Settings::default();
        press(&mut menu, &mut settings, &[Button::Up, Button::Select]);
        assert_eq!(menu.state().screen, Screen::About);

        press(&mut menu, &mut settings, &[Button::Down, Button::Select]);
        assert_eq!(menu.state().help, Some(1));
        // dismissing does not also move the selector
        menu.handle(Button::Down, &mut settings);
        assert_eq!(menu.state().help, None);
        assert_eq!(menu.state().selector, 1);

        press(&mut menu, &mut settings, &[Button::Up, Button::Select]);
        assert_eq!(menu.state().screen, Screen::MainMenu);
        assert_eq!(menu.state().selector, 3);
    }

    #[test]
    fn render_marks_selection_and_scrolls() {
        let mut menu = Menu::new(3);
        let mut settings = Settings::default();
        let mut frame = Frame::new();

        menu.render(&settings, &mut frame);
        assert_eq!(frame.row(0), "GATEKEY");
        assert_eq!(frame.row(1), ">Generate");
        assert_eq!(frame.row(3), " Set Complexity");

        menu.handle(Button::Up, &mut settings);
        menu.render(&settings, &mut frame);
        assert_eq!(frame.row(1), " Set Length");
        assert_eq!(frame.row(3), ">About");
    }

    #[test]
    fn render_length_and_current_complexity() {
        let mut menu = Menu::new(3);
        let mut settings = Settings::new(9, Complexity::Numbers);
        let mut frame = Frame::new();

        press(&mut menu, &mut settings, &[Button::Down, Button::Select]);
        menu.render(&settings, &mut frame);
        assert_eq!(frame.row(2), "     <  9 >");

        press(&mut menu, &mut settings, &[Button::Select, Button::Down, Button::Select]);
        menu.render(&settings, &mut frame);
        assert_eq!(frame.row(1), ">Numbers *");
        assert_eq!(frame.row(2), " Lowercase");
    }

    #[test]
    fn complexity_topic_shows_alphabet() {
        let mut menu = Menu::new(3);
        let mut settings = Settings::new(16, Complexity::Numbers);
        let mut frame = Frame::new();
        press(&mut menu, &mut settings, &[Button::Up, Button::Select, Button::Up, Button::Up, Button::Select]);
        assert_eq!(menu.state().help, Some(COMPLEXITY_TOPIC));
        menu.render(&settings, &mut frame);
        assert_eq!(frame.row(3), "0-9");

        settings.complexity = Complexity::AllSymbols;
        menu.render(&settings, &mut frame);
        assert_eq!(frame.row(3), "A-Z a-z 0-9 !@#");
    }

    #[test]
    fn status_frames() {
        let mut frame = Frame::new();
        render_status(Status::Working, &mut frame);
        assert_eq!(frame.row(1), "Working...");
        render_status(Status::Done, &mut frame);
        assert_eq!(frame.row(1), "Done.");
    }

    fn any_button() -> impl Strategy<Value = Button> {
        prop_oneof![Just(Button::Up), Just(Button::Down), Just(Button::Select)]
    }

    proptest! {
        #[test]
        fn selector_always_visible(visible in 1usize..5, buttons in proptest::collection::vec(any_button(), 0..300)) {
            let mut menu = Menu::new(visible);
            let mut settings = Settings::default();
            for b in buttons {
                if menu.handle(b, &mut settings) == Action::Generate {
                    menu.begin_generation();
                    menu.finish_generation();
                }
                prop_assert!(invariant_holds(&menu));
                prop_assert!((8..=64).contains(&settings.password_len()));
            }
        }
    }
}

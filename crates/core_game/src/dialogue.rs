//! Linear branching dialogue with typed side effects.

use bevy::input::keyboard::KeyCode;
use bevy::math::{Rect, Vec2};
use tracing::{info, warn};

use crate::input::{is_menu_down, is_menu_up, InputEvent};
use crate::render::{palette, DrawSurface, TextStyle};

const BOX_HEIGHT: f32 = 200.0;
const BOX_FILL: bevy::color::Color = bevy::color::Color::srgb(0.078, 0.078, 0.118);
const BOX_FRAME: bevy::color::Color = bevy::color::Color::srgb(0.392, 0.392, 0.471);

/// What choosing an option changes in the wider game. The router applies
/// these once the conversation ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogueEffect {
    LearnedSpeak,
    Healed,
    TriggerCombat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogueSignal {
    Continue,
    End,
}

#[derive(Clone, Copy, Debug)]
pub struct DialogueOption {
    pub text: &'static str,
    pub next: Option<&'static str>,
    pub effect: Option<DialogueEffect>,
}

#[derive(Clone, Copy, Debug)]
pub struct DialogueNode {
    pub id: &'static str,
    pub speaker: &'static str,
    pub text: &'static str,
    pub options: &'static [DialogueOption],
}

const fn option(
    text: &'static str,
    next: Option<&'static str>,
    effect: Option<DialogueEffect>,
) -> DialogueOption {
    DialogueOption { text, next, effect }
}

pub static SCRIPT: &[DialogueNode] = &[
    DialogueNode {
        id: "intro",
        speaker: "???",
        text: "...Light? No. Not light. Something... deeper.",
        options: &[
            option("(Try to speak)", Some("first_words"), None),
            option("(Listen)", Some("listen"), None),
        ],
    },
    DialogueNode {
        id: "first_words",
        speaker: "Hatchling",
        text: "Ma... na? ...Cor... ruption?",
        options: &[option(
            "...I am awake.",
            Some("awakened"),
            Some(DialogueEffect::LearnedSpeak),
        )],
    },
    DialogueNode {
        id: "listen",
        speaker: "The Forest",
        text: "*The corrupted roots hum with a discordant song. It welcomes you.*",
        options: &[option(
            "...I hear you.",
            Some("awakened"),
            Some(DialogueEffect::LearnedSpeak),
        )],
    },
    DialogueNode {
        id: "awakened",
        speaker: "Hatchling",
        text: "This hunger... it is a guide. I must find the source.",
        options: &[option("[Begin Journey]", None, None)],
    },
    DialogueNode {
        id: "combat_tutorial",
        speaker: "Instinct",
        text: "A twisted beast blocks the path. It seeks to consume.",
        options: &[option(
            "Defend yourself!",
            None,
            Some(DialogueEffect::TriggerCombat),
        )],
    },
    DialogueNode {
        id: "hunger",
        speaker: "Instinct",
        text: "The beast falls. Its energy lingers. Absorb it?",
        options: &[option("Consume (Heal)", None, Some(DialogueEffect::Healed))],
    },
];

fn find_node(id: &str) -> Option<&'static DialogueNode> {
    SCRIPT.iter().find(|node| node.id == id)
}

#[derive(Debug, Default)]
pub struct DialogueBox {
    node: Option<&'static DialogueNode>,
    selected: usize,
    effects: Vec<DialogueEffect>,
}

impl DialogueBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the conversation at `node_id`. Unknown ids leave the box closed.
    pub fn start(&mut self, node_id: &str) -> bool {
        let Some(node) = find_node(node_id) else {
            warn!(target: "core_game.dialogue", node_id, "unknown dialogue node");
            return false;
        };
        info!(target: "core_game.dialogue", node_id, "dialogue started");
        self.load(node);
        true
    }

    fn load(&mut self, node: &'static DialogueNode) {
        self.node = Some(node);
        self.selected = 0;
    }

    pub fn is_active(&self) -> bool {
        self.node.is_some()
    }

    pub fn current(&self) -> Option<&'static DialogueNode> {
        self.node
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Effects collected since the last call, in the order they were chosen.
    pub fn take_effects(&mut self) -> Vec<DialogueEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Option<DialogueSignal> {
        let node = self.node?;
        let key = event.pressed()?;

        if is_menu_up(key) {
            self.selected = self.selected.saturating_sub(1);
        } else if is_menu_down(key) {
            self.selected = (self.selected + 1).min(node.options.len().saturating_sub(1));
        } else if matches!(key, KeyCode::Enter | KeyCode::Space) {
            return Some(self.choose());
        }
        None
    }

    fn choose(&mut self) -> DialogueSignal {
        let Some(node) = self.node else {
            return DialogueSignal::End;
        };
        let Some(choice) = node.options.get(self.selected) else {
            self.node = None;
            return DialogueSignal::End;
        };

        if let Some(effect) = choice.effect {
            self.effects.push(effect);
        }
        match choice.next.and_then(find_node) {
            Some(next) => {
                self.load(next);
                DialogueSignal::Continue
            }
            None => {
                info!(target: "core_game.dialogue", node = node.id, "dialogue ended");
                self.node = None;
                DialogueSignal::End
            }
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        let Some(node) = self.node else {
            return;
        };
        let screen = surface.size();
        let top = screen.y - BOX_HEIGHT;
        let panel = Rect::new(0.0, top, screen.x, screen.y);
        surface.fill_rect(panel, BOX_FILL);
        surface.stroke_rect(panel, BOX_FRAME, 3.0);

        surface.text(
            node.speaker,
            Vec2::new(20.0, top + 20.0),
            TextStyle::new(28.0, palette::GOLD),
        );
        surface.text(
            node.text,
            Vec2::new(20.0, top + 60.0),
            TextStyle::new(24.0, palette::WHITE),
        );
        for (idx, option) in node.options.iter().enumerate() {
            let (prefix, color) = if idx == self.selected {
                ("> ", palette::GOLD)
            } else {
                ("  ", palette::TEXT_DIM)
            };
            surface.text(
                &format!("{prefix}{}", option.text),
                Vec2::new(40.0, top + 100.0 + idx as f32 * 30.0),
                TextStyle::new(24.0, color),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;

    fn press(dialogue: &mut DialogueBox, key: KeyCode) -> Option<DialogueSignal> {
        dialogue.handle_input(InputEvent::Pressed(key))
    }

    #[test]
    fn every_link_resolves() {
        for node in SCRIPT {
            for option in node.options {
                if let Some(next) = option.next {
                    assert!(find_node(next).is_some(), "{} -> {next}", node.id);
                }
            }
        }
    }

    #[test]
    fn unknown_node_is_refused() {
        let mut dialogue = DialogueBox::new();
        assert!(!dialogue.start("epilogue"));
        assert!(!dialogue.is_active());
    }

    #[test]
    fn intro_listen_path_learns_speech() {
        let mut dialogue = DialogueBox::new();
        assert!(dialogue.start("intro"));
        assert_eq!(press(&mut dialogue, KeyCode::ArrowDown), None);
        assert_eq!(press(&mut dialogue, KeyCode::ArrowDown), None);
        assert_eq!(dialogue.selected(), 1);
        assert_eq!(press(&mut dialogue, KeyCode::Enter), Some(DialogueSignal::Continue));
        assert_eq!(dialogue.current().map(|n| n.speaker), Some("The Forest"));
        assert_eq!(press(&mut dialogue, KeyCode::Space), Some(DialogueSignal::Continue));
        assert_eq!(press(&mut dialogue, KeyCode::Enter), Some(DialogueSignal::End));
        assert!(!dialogue.is_active());
        assert_eq!(dialogue.take_effects(), vec![DialogueEffect::LearnedSpeak]);
        assert!(dialogue.take_effects().is_empty());
    }

    #[test]
    fn selection_clamps_at_top() {
        let mut dialogue = DialogueBox::new();
        dialogue.start("intro");
        press(&mut dialogue, KeyCode::KeyW);
        assert_eq!(dialogue.selected(), 0);
    }

    #[test]
    fn tutorial_requests_combat() {
        let mut dialogue = DialogueBox::new();
        dialogue.start("combat_tutorial");
        assert_eq!(press(&mut dialogue, KeyCode::Enter), Some(DialogueSignal::End));
        assert_eq!(dialogue.take_effects(), vec![DialogueEffect::TriggerCombat]);
    }

    #[test]
    fn closed_box_ignores_input_and_draws_nothing() {
        let mut dialogue = DialogueBox::new();
        assert_eq!(press(&mut dialogue, KeyCode::Enter), None);
        let mut frame = DrawList::new(Vec2::new(1280.0, 720.0));
        dialogue.draw(&mut frame);
        assert!(frame.commands().is_empty());
    }

    #[test]
    fn draw_marks_selected_option() {
        let mut dialogue = DialogueBox::new();
        dialogue.start("intro");
        let mut frame = DrawList::new(Vec2::new(1280.0, 720.0));
        dialogue.draw(&mut frame);
        let texts: Vec<&str> = frame.texts().collect();
        assert!(texts.contains(&"> (Try to speak)"));
        assert!(texts.contains(&"  (Listen)"));
    }
}

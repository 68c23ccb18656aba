use iced::widget::{button, column, container, image as image_widget, row, text, Column, Row};
use iced::{Alignment, Background, Color, Element, Length, Subscription, Task, Theme};
use std::path::PathBuf;
use std::rc::Rc;

mod board;
mod codec;
mod ingest;
mod store;

use board::container::{ContainerKey, ContainerModel};
use board::item::Item;
use board::{Board, BoardContext};
use ingest::{DropEvent, IngestionPipeline, InputEvent};
use store::ItemStore;

/// Base font size the thumbnail height is derived from
const BASE_FONT_PX: f32 = 16.0;

/// Starter tiers, created on launch
const TIER_PALETTE: [(&str, &str); 6] = [
    ("#FF7F7F", "S"),
    ("#FFBF7F", "A"),
    ("#FFDF80", "B"),
    ("#FFFF7F", "C"),
    ("#BFFF7F", "D"),
    ("#7FFF7F", "F"),
];

/// Main application state
struct TierBoard {
    board: Board,
    pipeline: IngestionPipeline,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// A file was dropped onto the window
    FileDropped(PathBuf),
    /// Background ingestion completed with normalized items
    Ingested(Vec<Item>),
    /// User clicked the "Add Tier" button
    AddTier,
    /// User clicked a tier's delete button
    DeleteTier(ContainerKey),
}

impl TierBoard {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // If this fails, we panic because the app cannot function without
        // its storage
        let store = Rc::new(
            ItemStore::open_default()
                .expect("Failed to initialize storage. Check permissions and disk space."),
        );
        let ctx = Rc::new(BoardContext::new(BASE_FONT_PX, |message: &str| {
            eprintln!("⚠️  {}", message);
        }));

        let mut board = Board::new(store, Rc::clone(&ctx))
            .expect("Failed to load the holding area from storage.");
        for (color, name) in TIER_PALETTE {
            board
                .add_tier(color.to_string(), name.to_string())
                .expect("Failed to load a tier from storage.");
        }

        let item_count: usize = board.holding().list().len()
            + board.tiers().iter().map(|t| t.list().len()).sum::<usize>();
        println!("🎨 Tier Board initialized with {} images", item_count);

        let pipeline = IngestionPipeline::new(ctx.thumb_height());
        let status = format!("Ready. {} images on the board.", item_count);

        (
            TierBoard {
                board,
                pipeline,
                status,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FileDropped(path) => {
                self.status = format!("Ingesting {}...", path.display());
                let pipeline = self.pipeline;

                // Read and normalize in the background, commit on completion
                Task::perform(
                    async move {
                        match ingest::read_dropped_file(path).await {
                            Ok(file) => {
                                pipeline
                                    .ingest(InputEvent::Drop(DropEvent {
                                        internal_move: false,
                                        files: vec![file],
                                    }))
                                    .await
                            }
                            Err(e) => {
                                eprintln!("⚠️  Could not read dropped file: {}", e);
                                Vec::new()
                            }
                        }
                    },
                    Message::Ingested,
                )
            }
            Message::Ingested(items) => {
                let count = items.len();
                self.board.commit_ingested(items);
                self.status = if count > 0 {
                    format!("✅ Added {} image(s) to the holding area.", count)
                } else {
                    "Nothing to ingest (not an image?).".to_string()
                };
                Task::none()
            }
            Message::AddTier => {
                let (color, base) = TIER_PALETTE[self.board.tiers().len() % TIER_PALETTE.len()];
                let name = format!("{} {}", base, self.board.tiers().len() + 1);
                match self.board.add_tier(color.to_string(), name.clone()) {
                    Ok(_) => self.status = format!("Added tier \"{}\".", name),
                    Err(e) => eprintln!("⚠️  Could not add tier: {}", e),
                }
                Task::none()
            }
            Message::DeleteTier(key) => {
                if let Err(e) = self.board.remove_tier(&key) {
                    eprintln!("⚠️  Could not delete tier: {}", e);
                }
                self.status = "Tier deleted.".to_string();
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let mut content: Column<Message> = column![text("Tier Board").size(32)]
            .spacing(8)
            .padding(24);

        for tier in self.board.tiers() {
            content = content.push(tier_row(tier));
        }

        content = content.push(
            container(item_strip(self.board.holding()))
                .width(Length::Fill)
                .padding(8),
        );
        content = content.push(
            row![
                button("Add Tier").on_press(Message::AddTier).padding(8),
                text("Drop image files anywhere to add them.").size(14),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        );
        content = content.push(text(&self.status).size(14));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Listen for files dropped onto the window
    fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// One tier: colored name label, its images, and a delete button
fn tier_row(tier: &ContainerModel) -> Element<'_, Message> {
    let ContainerKey::Tier { color, name } = tier.key() else {
        unreachable!("tiers always carry a tier key");
    };

    let label_color = parse_hex_color(color);
    let label = container(text(name.clone()).size(16))
        .style(move |_theme| container::Style {
            background: Some(Background::Color(label_color)),
            ..container::Style::default()
        })
        .width(96)
        .padding(16)
        .align_x(Alignment::Center);

    row![
        label,
        item_strip(tier),
        button("x").on_press(Message::DeleteTier(tier.key().clone())),
    ]
    .spacing(4)
    .align_y(Alignment::Center)
    .into()
}

/// The ordered images of one container, in rendering order
fn item_strip(model: &ContainerModel) -> Element<'_, Message> {
    let mut strip: Row<Message> = row![].spacing(4).align_y(Alignment::Center);
    if model.list().is_empty() {
        return strip.push(text("Drop images here").size(14)).into();
    }
    for item in model.list() {
        if let Some(bytes) = codec::decode_data_uri(&item.image_data) {
            strip = strip.push(image_widget(image_widget::Handle::from_bytes(bytes)));
        }
    }
    strip.into()
}

/// Parse a #RRGGBB color, falling back to gray for anything else
fn parse_hex_color(hex: &str) -> Color {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() == 6 {
        if let Ok(value) = u32::from_str_radix(digits, 16) {
            return Color::from_rgb8(
                ((value >> 16) & 0xFF) as u8,
                ((value >> 8) & 0xFF) as u8,
                (value & 0xFF) as u8,
            );
        }
    }
    Color::from_rgb8(0x80, 0x80, 0x80)
}

fn main() -> iced::Result {
    iced::application("Tier Board", TierBoard::update, TierBoard::view)
        .subscription(TierBoard::subscription)
        .theme(TierBoard::theme)
        .centered()
        .run_with(TierBoard::new)
}

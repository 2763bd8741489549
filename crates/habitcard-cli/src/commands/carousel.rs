use clap::Subcommand;
use habitcard_core::habit::MemoryRepository;
use habitcard_core::{
    CardLayout, Carousel, Config, Event, HabitId, HabitStore, MonospaceMeasurer, StoreHandle,
};
use serde_json::json;
use std::time::{Duration, Instant};

use super::open_store;

/// Frame interval of the real-time hold simulation.
const FRAME_MS: u64 = 16;

#[derive(Subcommand)]
pub enum CarouselAction {
    /// Print the render list with its boundary copies
    List,
    /// Settle the scroll at an offset and report any reseek
    Settle {
        /// Scroll offset in pixels
        offset: f32,
    },
    /// Print the transform snapshot of every card (never persists)
    Frame {
        /// Scroll offset in pixels (defaults to the first real card)
        offset: Option<f32>,
        /// Card being held
        #[arg(long)]
        index: Option<usize>,
        /// How long the card has been held
        #[arg(long, default_value = "0")]
        held_ms: u64,
    },
    /// Print the section offsets of a habit's card
    Layout {
        /// Habit ID
        id: String,
    },
    /// Hold the centered card in real time; a full hold toggles the habit
    Hold {
        /// Card to hold (defaults to the centered one)
        index: Option<usize>,
        /// Lift the finger after this many milliseconds
        #[arg(long)]
        release_after_ms: Option<u64>,
    },
}

pub fn run(action: CarouselAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        CarouselAction::List => {
            let carousel = Carousel::new(open_store()?, &config);
            let items: Vec<_> = carousel
                .render_list()
                .items()
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    json!({
                        "index": index,
                        "key": item.key(),
                        "name": item.habit.name,
                        "duplicate": item.is_duplicate(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        CarouselAction::Settle { offset } => {
            let mut carousel = Carousel::new(open_store()?, &config);
            carousel.on_scroll(offset);
            match carousel.on_momentum_end(offset) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => {
                    let out = json!({
                        "type": "Rest",
                        "index": carousel.paging().current_index(),
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
        }
        CarouselAction::Frame {
            offset,
            index,
            held_ms,
        } => {
            // Work on a copy so a preview never toggles anything on disk.
            let preview = StoreHandle::new(HabitStore::load(MemoryRepository::with_habits(
                open_store()?.snapshot(),
            ))?);
            let mut carousel = Carousel::new(preview, &config);
            if let Some(offset) = offset {
                carousel.on_momentum_end(offset);
            }
            if let Some(index) = index {
                carousel.press_start(index, 0);
                carousel.tick(held_ms);
            }
            let frame = carousel.frame(held_ms);
            println!("{}", serde_json::to_string_pretty(&frame)?);
        }
        CarouselAction::Layout { id } => {
            let id = HabitId::parse(&id)?;
            let habit = open_store()?
                .get(&id)
                .ok_or_else(|| format!("habit not found: {id}"))?;
            let layout =
                CardLayout::for_habit(&habit, &MonospaceMeasurer::default(), &config.layout);
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        CarouselAction::Hold {
            index,
            release_after_ms,
        } => {
            let mut carousel = Carousel::new(open_store()?, &config);
            let index = index.unwrap_or_else(|| carousel.paging().current_index());
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(hold(&mut carousel, index, release_after_ms, &config))?;
        }
    }
    Ok(())
}

/// Press, tick every frame until released or committed, then lift.
async fn hold(
    carousel: &mut Carousel,
    index: usize,
    release_after_ms: Option<u64>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let release_at = release_after_ms.unwrap_or(config.hold.complete_ms + FRAME_MS);
    tracing::debug!(index, release_at, "simulating hold");
    let started = Instant::now();
    let elapsed = || started.elapsed().as_millis() as u64;

    let Some(event) = carousel.press_start(index, elapsed()) else {
        eprintln!("card {index} is not the centered card");
        std::process::exit(1);
    };
    print_event(&event)?;

    let mut interval = tokio::time::interval(Duration::from_millis(FRAME_MS));
    loop {
        interval.tick().await;
        let now = elapsed();
        if now >= release_at {
            for event in carousel.press_end(index, now) {
                print_event(&event)?;
            }
            break;
        }
        for event in carousel.tick(now) {
            print_event(&event)?;
        }
    }
    Ok(())
}

fn print_event(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

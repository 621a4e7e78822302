use std::sync::Arc;

use anyhow::Context;
use claim::{ClaimState, ClaimView, Config, DropClient, Notice, Query, ReadCache, SupplyCounters, WalletSession};
use raylib::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod image_loader;
use image_loader::ImageLoader;

mod ui;
use ui::{
    alert, button, centered_text, clicked, paragraph, text_field, toast, ALERT_OK, CLAIM_BUTTON, FONT_SIZE,
    IMAGE_RECT, IMAGE_SIZE, MINUS_BUTTON, PLUS_BUTTON, QUANTITY_FIELD, SCREEN_HEIGHT, SCREEN_WIDTH, TITLE_SIZE,
    WALLET_BUTTON,
};

const TOAST_SECS: f32 = 4.0;

/// Presentation state that is not part of the claim flow.
#[derive(Default)]
struct Form {
    quantity_text: String,
    editing: bool,
    input_error: Option<String>,
    alert: Option<String>,
    toast: Option<(String, f32)>,
}

/// Counter line under the description.
fn supply_label(supply: Option<SupplyCounters>, claimed_loading: bool, total_loading: bool) -> String {
    match supply {
        Some(s) if s.is_unlimited() => format!("{} claimed / unlimited", s.claimed),
        Some(s) => format!("{} / {} claimed", s.claimed, s.total),
        None if claimed_loading || total_loading => "Loading supply...".to_string(),
        None => "Supply unavailable".to_string(),
    }
}

/// Whether a poll result means the supply counters may have moved.
fn settles_claim(polled: Option<ClaimState>) -> bool {
    matches!(polled, Some(ClaimState::Confirmed | ClaimState::Errored))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("could not load configuration")?;
    let client = Arc::new(DropClient::from_config(&config).context("could not create drop client")?);
    let cache = ReadCache::new(Arc::clone(&client), config.refresh_interval());
    let mut view = ClaimView::new(client, config.currency_decimals);
    let mut wallet = WalletSession::disconnected();
    let mut form = Form::default();

    // Init raylib
    let (mut rl, thread) = raylib::init()
        .size(SCREEN_WIDTH, SCREEN_HEIGHT)
        .title("Claim")
        .msaa_4x()
        .build();
    rl.set_target_fps(60);

    // declared after the handle so textures are unloaded before the window closes
    let mut images = ImageLoader::new();

    info!("viewer started");

    while !rl.window_should_close() {
        // a failed multi-token claim may still have minted some editions
        if settles_claim(view.poll()) {
            cache.invalidate(&Query::SUPPLY);
        }
        while let Some(notice) = view.next_notice() {
            match notice {
                Notice::Claimed(receipt) => {
                    for signature in &receipt.signatures {
                        info!(explorer = %config.explorer_url(signature), "claim receipt");
                    }
                    form.toast = Some((format!("Claimed {} NFT(s)!", receipt.quantity), TOAST_SECS));
                }
                Notice::Alert(message) => form.alert = Some(message),
            }
        }

        let metadata = cache.metadata();
        let claimed = cache.claimed_supply();
        let total = cache.total_supply();
        let condition_read = cache.claim_condition();
        let condition = condition_read.data.flatten();
        let supply = cache.supply();
        let blocker = view.claim_blocker(&wallet, supply, condition.as_ref());

        // Input, the alert blocks everything else until dismissed
        if form.alert.is_some() {
            if clicked(&rl, ALERT_OK) || rl.is_key_pressed(KeyboardKey::KEY_ENTER) {
                form.alert = None;
            }
        } else {
            if clicked(&rl, WALLET_BUTTON) {
                if wallet.is_connected() {
                    wallet.disconnect();
                } else if let Err(e) = wallet.connect(&config.keypair_path) {
                    form.alert = Some(e.to_string());
                }
            }

            if clicked(&rl, MINUS_BUTTON) {
                view.decrement();
                form.editing = false;
                form.input_error = None;
            }
            if clicked(&rl, PLUS_BUTTON) {
                view.increment();
                form.editing = false;
                form.input_error = None;
            }

            if clicked(&rl, QUANTITY_FIELD) && !form.editing {
                form.editing = true;
                form.quantity_text = view.quantity().to_string();
            }
            if form.editing {
                while let Some(c) = rl.get_char_pressed() {
                    if !c.is_control() && form.quantity_text.len() < 12 {
                        form.quantity_text.push(c);
                    }
                }
                if rl.is_key_pressed(KeyboardKey::KEY_BACKSPACE) {
                    form.quantity_text.pop();
                }
                if rl.is_key_pressed(KeyboardKey::KEY_ENTER) {
                    match view.set_quantity_input(&form.quantity_text) {
                        Ok(_) => form.input_error = None,
                        Err(e) => form.input_error = Some(e.to_string()),
                    }
                    form.editing = false;
                }
            }

            if clicked(&rl, CLAIM_BUTTON) && blocker.is_none() {
                form.editing = false;
                if let Err(blocked) = view.claim(&wallet, supply, condition.as_ref()) {
                    form.alert = Some(blocked.to_string());
                }
            }
        }

        if let Some((_, remaining)) = form.toast.as_mut() {
            *remaining -= rl.get_frame_time();
            if *remaining <= 0.0 {
                form.toast = None;
            }
        }

        let image_url = metadata.data.as_ref().map(|m| m.image.clone()).unwrap_or_default();
        images.load(&mut rl, &thread, &image_url);

        // Draw
        {
            let mut d = rl.begin_drawing(&thread);
            d.clear_background(Color::RAYWHITE);

            match images.get(&image_url) {
                Some(texture) => {
                    let scale = IMAGE_SIZE / texture.width.max(texture.height).max(1) as f32;
                    d.draw_texture_ex(texture, Vector2::new(IMAGE_RECT.x, IMAGE_RECT.y), 0.0, scale, Color::WHITE);
                }
                None => {
                    d.draw_rectangle_rec(IMAGE_RECT, Color::LIGHTGRAY);
                    let label = if metadata.is_loading { "Loading..." } else { "" };
                    centered_text(&mut d, IMAGE_RECT, label, FONT_SIZE, Color::GRAY);
                }
            }

            let mut y = (IMAGE_RECT.y + IMAGE_RECT.height) as i32 + 20;
            match &metadata.data {
                Some(m) => {
                    y = paragraph(&mut d, &m.name, y, TITLE_SIZE, SCREEN_WIDTH - 80, Color::BLACK);
                    y = paragraph(&mut d, &m.description, y + 4, FONT_SIZE, SCREEN_WIDTH - 120, Color::DARKGRAY);
                }
                None if metadata.is_loading => {
                    y = paragraph(&mut d, "Loading...", y, TITLE_SIZE, SCREEN_WIDTH - 80, Color::GRAY);
                }
                None => {}
            }

            let supply_text = supply_label(supply, claimed.is_loading, total.is_loading);
            paragraph(&mut d, &supply_text, y.max(500), FONT_SIZE, SCREEN_WIDTH - 80, Color::DARKGRAY);

            button(&mut d, MINUS_BUTTON, "-", true);
            let quantity_text = if form.editing {
                form.quantity_text.clone()
            } else {
                view.quantity().to_string()
            };
            text_field(&mut d, QUANTITY_FIELD, &quantity_text, form.editing);
            button(&mut d, PLUS_BUTTON, "+", true);
            if let Some(error) = &form.input_error {
                d.draw_text(error, QUANTITY_FIELD.x as i32, 612, FONT_SIZE - 4, Color::MAROON);
            }

            let claim_label = if view.is_submitting() {
                "Claiming...".to_string()
            } else if condition_read.is_loading {
                "Loading price...".to_string()
            } else {
                format!("Claim ({} {})", view.total_price(condition.as_ref()), config.currency_symbol)
            };
            button(&mut d, CLAIM_BUTTON, &claim_label, blocker.is_none());
            if let Some(blocked) = &blocker {
                let rect = Rectangle::new(CLAIM_BUTTON.x - 100.0, CLAIM_BUTTON.y + 60.0, CLAIM_BUTTON.width + 200.0, 24.0);
                centered_text(&mut d, rect, &blocked.to_string(), FONT_SIZE - 4, Color::GRAY);
            }

            match wallet.account() {
                Some(account) => {
                    let short = account.to_string();
                    let short = format!("{}..{}", &short[..4], &short[short.len() - 4..]);
                    d.draw_text(&short, 20, WALLET_BUTTON.y as i32 + 10, FONT_SIZE, Color::DARKGRAY);
                    button(&mut d, WALLET_BUTTON, "Disconnect", true);
                }
                None => button(&mut d, WALLET_BUTTON, "Connect wallet", true),
            }

            if let Some((message, _)) = &form.toast {
                toast(&mut d, message);
            }
            if let Some(message) = &form.alert {
                alert(&mut d, message);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supply_label_states() {
        let supply = Some(SupplyCounters { claimed: 3, total: 10 });
        assert_eq!(supply_label(supply, false, false), "3 / 10 claimed");

        let unlimited = Some(SupplyCounters { claimed: 3, total: u64::MAX });
        assert_eq!(supply_label(unlimited, false, false), "3 claimed / unlimited");

        assert_eq!(supply_label(None, true, false), "Loading supply...");
        assert_eq!(supply_label(None, false, false), "Supply unavailable");
    }

    #[test]
    fn failed_claim_refreshes_supply_too() {
        assert!(settles_claim(Some(ClaimState::Confirmed)));
        assert!(settles_claim(Some(ClaimState::Errored)));
        assert!(!settles_claim(Some(ClaimState::Submitting)));
        assert!(!settles_claim(None));
    }
}

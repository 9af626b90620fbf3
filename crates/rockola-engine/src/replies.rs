// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-visible reply text.
//!
//! Every denied or failed request produces exactly one reply naming the
//! specific reason -- never a generic "denied". Menu rendering lives with
//! the transport frontend; these are only the engine's own messages.

use rockola_core::types::{FilterAction, Track};

use crate::admission::DenyReason;
use crate::queue::Eta;

pub fn deny(reason: &DenyReason) -> String {
    match reason {
        DenyReason::PermanentlyBlocked => {
            "Your number is blocked from requesting songs.".to_string()
        }
        DenyReason::ContentRejected { action, .. } => match action {
            FilterAction::Warn => {
                "That request contains inappropriate language. Please rephrase it. \
                 Repeated violations will get you blocked."
                    .to_string()
            }
            FilterAction::TempBlock => {
                "That request is not acceptable. You are temporarily blocked for one hour."
                    .to_string()
            }
            FilterAction::PermaBlock => {
                "That request is not acceptable. Your number has been blocked.".to_string()
            }
        },
        DenyReason::LocationRequired => {
            "Please share your location first so we can confirm you are at the plaza."
                .to_string()
        }
        DenyReason::GeofenceRejected => {
            "You need to be at the plaza to request songs. Come by and try again!".to_string()
        }
        DenyReason::QuotaExceeded { limit } => format!(
            "You have reached your limit of {limit} songs for today. \
             Upgrade your plan for more, or come back tomorrow."
        ),
        DenyReason::TierCooldownActive { minutes_remaining } => format!(
            "You can request your next song in {minutes_remaining} minutes."
        ),
        DenyReason::DuplicateToday => {
            "You already added that song today. Pick a different one.".to_string()
        }
        DenyReason::CooldownActive { minutes_remaining } => format!(
            "That song played recently. It can be requested again in {minutes_remaining} minutes."
        ),
    }
}

pub fn accepted(track: &Track, eta: Option<Eta>, daily_count: u32, daily_limit: Option<u32>) -> String {
    let mut reply = format!(
        "Song added!\n{} - {}",
        track.name,
        track.artist_line()
    );
    if let Some(eta) = eta {
        reply.push_str(&format!(
            "\nPlaying in about {}m {}s.",
            eta.minutes, eta.seconds
        ));
    }
    match daily_limit {
        Some(limit) => reply.push_str(&format!("\nSongs today: {daily_count}/{limit}.")),
        None => reply.push_str(&format!("\nSongs today: {daily_count}.")),
    }
    reply
}

pub fn repeat_warning(minutes_elapsed: i64) -> String {
    format!(
        "\nNote: this song already played {minutes_elapsed} minutes ago. \
         Your tier lets you repeat it."
    )
}

pub fn transient_failure() -> String {
    "Something went wrong adding your song. Please try again in a moment.".to_string()
}

pub fn no_results(query: &str) -> String {
    format!("No songs found for \"{query}\". Try another title or artist.")
}

pub fn location_recorded(inside: bool) -> String {
    if inside {
        "Location confirmed -- you are at the plaza. Send a song title to make a request."
            .to_string()
    } else {
        "Location received, but you appear to be outside the plaza.".to_string()
    }
}

pub fn coming_up(track: &Track, eta: Eta, can_cancel: bool) -> String {
    let mut msg = format!(
        "Your song is coming up!\n{} - {}\nPlaying in about {}m {}s.\n\nWill you be around to hear it?",
        track.name,
        track.artist_line(),
        eta.minutes,
        eta.seconds
    );
    if can_cancel {
        msg.push_str(
            "\n1 - Yes, I'll be there\n2 - No, cancel it\n\nIf you don't answer, we'll keep it queued.",
        );
    } else {
        msg.push_str("\nYour song has VIP priority and cannot be cancelled.");
    }
    msg
}

pub fn notification_confirmed(track: &Track) -> String {
    format!(
        "Great! Your song stays in the queue.\n{} - {}",
        track.name,
        track.artist_line()
    )
}

pub fn notification_cancelled(track: &Track) -> String {
    format!(
        "Song cancelled and removed from the queue:\n{} - {}\nYou can request another whenever you like.",
        track.name,
        track.artist_line()
    )
}

pub fn vip_cancel_denied() -> String {
    "As a VIP your song has priority and cannot be cancelled. \
     If you can't stay, it will play anyway."
        .to_string()
}

pub fn notification_reprompt() -> String {
    "Please reply:\n1 - to confirm you'll be there\n2 - to cancel the song".to_string()
}

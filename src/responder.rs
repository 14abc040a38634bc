// File: src/responder.rs
//
// What the chat side does with a community's model: when to speak up
// unprompted, what to say, and the handful of commands built on the model.
use crate::core::chain::MarkovChain;
use crate::core::hieroglyph::{back_to_alphabet, to_hieroglyphs};
use crate::core::types::MediaKind;
use crate::validator::{get_valid_random, MediaValidator};
use rand::Rng;
use tokio::sync::Mutex;

/// Reply lengths run 4..=25; the top value means "post media instead".
const REPLY_LENGTH_MIN: usize = 4;
const REPLY_LENGTH_MAX: usize = 25;
const PING_LENGTH_MAX: usize = 15;
const HIEROGLYPH_LENGTH: (usize, usize) = (10, 90);

/// Rate 1 or a direct mention always answers, rate 0 never does,
/// otherwise the odds are 1 in `reply_rate`.
pub fn should_reply<R: Rng + ?Sized>(reply_rate: u32, mentioned: bool, rng: &mut R) -> bool {
    match reply_rate {
        _ if mentioned => true,
        1 => true,
        0 => false,
        rate => rng.gen_range(1..=rate) == 1,
    }
}

/// What an unprompted reply will be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPlan {
    Text(usize),
    Media(MediaKind),
}

pub fn plan_reply<R: Rng + ?Sized>(rng: &mut R) -> ReplyPlan {
    let n = rng.gen_range(REPLY_LENGTH_MIN..=REPLY_LENGTH_MAX);
    if n < REPLY_LENGTH_MAX {
        return ReplyPlan::Text(n);
    }
    let kind = if rng.gen::<f64>() < 0.33 {
        MediaKind::Gif
    } else if rng.gen::<f64>() < 0.5 {
        MediaKind::Image
    } else {
        MediaKind::Video
    };
    ReplyPlan::Media(kind)
}

/// Carries out a plan. `None` only for text on an empty model.
///
/// Media candidates are copied under the lock and checked after it is
/// released, so a slow link never holds up the community.
pub async fn compose_reply(
    chain: &Mutex<MarkovChain>,
    validator: &dyn MediaValidator,
    plan: ReplyPlan,
) -> Option<String> {
    match plan {
        ReplyPlan::Text(length) => chain.lock().await.talk(length),
        ReplyPlan::Media(kind) => {
            let candidates = chain.lock().await.media().candidates(kind);
            Some(get_valid_random(validator, candidates, kind).await)
        }
    }
}

/// Continues whatever the user asked an opinion about.
pub fn opinion<R: Rng + ?Sized>(chain: &MarkovChain, about: &str, rng: &mut R) -> Option<String> {
    let length = rng.gen_range(REPLY_LENGTH_MIN..=REPLY_LENGTH_MAX);
    chain.generate_from_with_rng(about, length, rng)
}

pub fn ping<R: Rng + ?Sized>(chain: &MarkovChain, rng: &mut R) -> Option<String> {
    let length = rng.gen_range(1..=PING_LENGTH_MAX);
    chain.talk_with_rng(length, rng)
}

/// Encodes `text`, or something freshly generated when none is given.
pub fn hieroglyphs<R: Rng + ?Sized>(chain: &MarkovChain, text: Option<&str>, rng: &mut R) -> Option<String> {
    match text {
        Some(text) => Some(to_hieroglyphs(text)),
        None => {
            let length = rng.gen_range(HIEROGLYPH_LENGTH.0..=HIEROGLYPH_LENGTH.1);
            chain.talk_with_rng(length, rng).map(|t| to_hieroglyphs(&t))
        }
    }
}

pub fn unhieroglyphs(text: &str) -> String {
    back_to_alphabet(text)
}

pub fn deletion_notice(found: bool, message: &str) -> String {
    let label = if found { "Deleted data:" } else { "Data not found:" };
    format!("{} `{}`", label, message)
}

// Starting-pitcher inference from an ordered plate-appearance stream.
//
// The feed carries no explicit inning markers, so the only signal for the
// top/bottom-of-the-1st boundary is the lineup counters on each PA:
// `pa_order` climbs while one side bats and snaps back when the other side
// takes over, and `pa_round` stays at 1 until a lineup has cycled. The first
// index where the order resets while the previous PA was still in its first
// cycle marks the bottom of the 1st.
//
// Assumption carried from the source data: `pa_order` never resets for any
// reason other than a half-inning change. Unverified against edge cases such
// as lineup skips; fixtures from real games are the only way to validate it.

use tracing::debug;

use crate::model::GameRecord;

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// The two starters of a game, identified by which half-inning they pitched.
///
/// Which club each half belongs to is decided by the caller from the literal
/// team codes on the game record, not assumed here: conventionally the home
/// side pitches the top of the 1st, but the upstream source may encode the
/// batting team generically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartingPitchers {
    /// Pitcher of PA index 0, on the mound for the top of the 1st.
    pub top_half: Option<String>,
    /// Pitcher at the first detected half-inning transition. `None` when the
    /// game ends before a transition is observable (e.g. rain-shortened with
    /// no bottom-of-1st data).
    pub bottom_half: Option<String>,
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Determine both starters for one game.
///
/// The transition signature is `pa_order[i] <= pa_order[i-1]` while
/// `pa_round[i-1] == 1`: the lineup slot reset before the first full cycle
/// completed. With fewer than two PAs only the top-half starter (or neither)
/// can be known; an absent transition degrades the bottom half to `None`,
/// never to a wrong name.
pub fn detect(game: &GameRecord) -> StartingPitchers {
    let pa_list = &game.pa_list;
    let top_half = pa_list.first().map(|pa| pa.pitcher.name.clone());

    let mut bottom_half = None;
    for i in 1..pa_list.len() {
        let order_reset = pa_list[i].pa_order <= pa_list[i - 1].pa_order;
        let first_cycle = pa_list[i - 1].pa_round == 1;
        if order_reset && first_cycle {
            bottom_half = Some(pa_list[i].pitcher.name.clone());
            break;
        }
    }

    if top_half.is_some() && bottom_half.is_none() {
        debug!(
            "no half-inning transition in {} vs {} ({} PAs); bottom-half starter undefined",
            game.away.abbr,
            game.home.abbr,
            pa_list.len()
        );
    }

    StartingPitchers {
        top_half,
        bottom_half,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

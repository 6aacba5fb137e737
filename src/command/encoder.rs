// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-dialect spelling of actions.

use crate::error::EncodeError;
use crate::model::{CommandDialect, Model};
use crate::types::KeySwitch;

use super::{Action, Command};

/// Encodes a typed action for a model.
///
/// # Errors
///
/// Returns `EncodeError::Unsupported` if the action targets a bank the
/// model does not have.
pub fn encode_action(model: Model, action: &Action) -> Result<Command, EncodeError> {
    if let Some(me) = action.mix_effect()
        && !model.has_mix_effect(me)
    {
        return Err(EncodeError::Unsupported {
            action: format!("{} on M/E {me}", action.id()),
            model: model.label().to_string(),
        });
    }

    let text = match model.info().dialect {
        CommandDialect::Tokens => tokens(model, action),
        CommandDialect::Verbs => verbs(model, action),
    };
    Ok(Command::new(text))
}

fn tokens(model: Model, action: &Action) -> String {
    match action {
        Action::Cut { me } => format!("me_{me}_cut"),
        Action::Auto { me } => format!("me_{me}_auto"),
        Action::FadeToBlack { me } => format!("me_{me}_ftb"),
        Action::Key { me, key, switch } => format!("me_{me}_key_{key}:{switch}"),
        Action::Program { me, source } => format!("me_{me}_program:{source}"),
        Action::Preview { me, source } => format!("me_{me}_preview:{source}"),
        Action::Raw(text) => text.clone(),
        Action::GetState => model.info().bootstrap_command.to_string(),
    }
}

fn verbs(model: Model, action: &Action) -> String {
    match action {
        Action::Cut { me } => format!("CUT {me}"),
        Action::Auto { me } => format!("AUTO {me}"),
        Action::FadeToBlack { me } => format!("FTB {me}"),
        Action::Key { me, key, switch } => {
            let switch = match switch {
                KeySwitch::On => "ON",
                KeySwitch::Off => "OFF",
                KeySwitch::Toggle => "TOGGLE",
            };
            format!("KEY {me} {key} {switch}")
        }
        Action::Program { me, source } => format!("PGM {me} {source}"),
        Action::Preview { me, source } => format!("PVW {me} {source}"),
        Action::Raw(text) => text.clone(),
        Action::GetState => model.info().bootstrap_command.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KeyIndex, MixEffect};

    fn me(n: u8) -> MixEffect {
        MixEffect::new(n).unwrap()
    }

    #[test]
    fn token_dialect() {
        let cases = [
            (Action::Cut { me: me(1) }, "me_1_cut"),
            (Action::Auto { me: me(2) }, "me_2_auto"),
            (Action::FadeToBlack { me: me(1) }, "me_1_ftb"),
            (
                Action::Key {
                    me: me(2),
                    key: KeyIndex::new(4).unwrap(),
                    switch: KeySwitch::Toggle,
                },
                "me_2_key_4:toggle",
            ),
            (Action::Program { me: me(1), source: 3 }, "me_1_program:3"),
            (Action::Preview { me: me(2), source: 10 }, "me_2_preview:10"),
        ];
        for (action, expected) in cases {
            assert_eq!(encode_action(Model::Studio, &action).unwrap().as_str(), expected);
        }
    }

    #[test]
    fn verb_dialect() {
        let cases = [
            (Action::Cut { me: me(1) }, "CUT 1"),
            (Action::Auto { me: me(2) }, "AUTO 2"),
            (Action::FadeToBlack { me: me(2) }, "FTB 2"),
            (
                Action::Key {
                    me: me(1),
                    key: KeyIndex::new(2).unwrap(),
                    switch: KeySwitch::Off,
                },
                "KEY 1 2 OFF",
            ),
            (Action::Program { me: me(2), source: 5 }, "PGM 2 5"),
            (Action::Preview { me: me(1), source: 6 }, "PVW 1 6"),
        ];
        for (action, expected) in cases {
            assert_eq!(
                encode_action(Model::StudioClassic, &action).unwrap().as_str(),
                expected
            );
        }
    }

    #[test]
    fn second_bank_unsupported_on_compact() {
        let result = encode_action(Model::Compact, &Action::Cut { me: me(2) });
        assert_eq!(
            result,
            Err(EncodeError::Unsupported {
                action: "cut on M/E 2".to_string(),
                model: "Compact 1 M/E".to_string(),
            })
        );
    }

    #[test]
    fn raw_passes_through() {
        let action = Action::Raw("anything goes".to_string());
        for model in Model::ALL {
            assert_eq!(encode_action(model, &action).unwrap().as_str(), "anything goes");
        }
    }
}

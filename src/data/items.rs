use crate::{
    ecs::components::{EquipmentSlot, Equippable, ItemEffect},
    messages::Message,
    palette::{self, Color},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemKind {
    HealingPotion,
    Sword,
    Shield,
    LightningScroll,
    FireballScroll,
    ConfusionScroll,
    Dagger,
}

#[derive(Clone, Debug)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: Color,
    pub effect: Option<ItemEffect>,
    pub targeting: Option<Message>,
    pub equippable: Option<Equippable>,
}

impl ItemKind {
    pub fn template(self) -> ItemTemplate {
        match self {
            ItemKind::HealingPotion => ItemTemplate::consumable(
                "Healing Potion",
                '!',
                palette::VIOLET,
                ItemEffect::Heal { amount: 40 },
            ),
            ItemKind::LightningScroll => ItemTemplate::consumable(
                "Lightning Scroll",
                '#',
                palette::YELLOW,
                ItemEffect::Lightning {
                    damage: 40,
                    maximum_range: 5,
                },
            ),
            ItemKind::FireballScroll => ItemTemplate::consumable(
                "Fireball Scroll",
                '#',
                palette::RED,
                ItemEffect::Fireball {
                    damage: 25,
                    radius: 3,
                },
            )
            .with_targeting(
                "Left-click a target tile for the fireball, or press Escape to cancel.",
            ),
            ItemKind::ConfusionScroll => ItemTemplate::consumable(
                "Confusion Scroll",
                '#',
                palette::LIGHT_PINK,
                ItemEffect::Confuse { turns: 10 },
            )
            .with_targeting("Left-click an enemy to confuse it, or press Escape to cancel."),
            ItemKind::Sword => ItemTemplate::gear(
                "Sword",
                '/',
                palette::SKY,
                Equippable {
                    power_bonus: 3,
                    ..Equippable::new(EquipmentSlot::MainHand)
                },
            ),
            ItemKind::Shield => ItemTemplate::gear(
                "Shield",
                '[',
                palette::DARKER_ORANGE,
                Equippable {
                    defense_bonus: 1,
                    ..Equippable::new(EquipmentSlot::OffHand)
                },
            ),
            ItemKind::Dagger => ItemTemplate::gear(
                "Dagger",
                '-',
                palette::SKY,
                Equippable {
                    power_bonus: 2,
                    ..Equippable::new(EquipmentSlot::MainHand)
                },
            ),
        }
    }
}

impl ItemTemplate {
    fn consumable(name: &'static str, glyph: char, color: Color, effect: ItemEffect) -> Self {
        Self {
            name,
            glyph,
            color,
            effect: Some(effect),
            targeting: None,
            equippable: None,
        }
    }

    fn gear(name: &'static str, glyph: char, color: Color, equippable: Equippable) -> Self {
        Self {
            name,
            glyph,
            color,
            effect: None,
            targeting: None,
            equippable: Some(equippable),
        }
    }

    fn with_targeting(mut self, prompt: &str) -> Self {
        self.targeting = Some(Message::new(prompt, palette::LIGHT_CYAN));
        self
    }
}

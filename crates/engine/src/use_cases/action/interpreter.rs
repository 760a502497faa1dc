//! Keyword interpreter for free-text player actions.
//!
//! Used whenever the model is unavailable or its verdict is unusable. The
//! rule table is scanned top to bottom and the first category with a
//! matching keyword wins, so throwing beats attacking beats working.

use officesbx_domain::{ActionOutcome, AnimationCommand, AnimationKind, NpcReaction, StateChanges};

use crate::infrastructure::ports::{chance, choose, RandomPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Throw,
    Attack,
    Work,
    Slack,
    Talk,
    Other,
}

/// Ordered rule table. Keywords are matched against the lower-cased action:
/// ASCII keywords as whole words, CJK keywords as substrings. A bare `打`
/// is not a keyword since it also starts 打开, 打印 and 打卡.
const RULES: &[(ActionCategory, &[&str])] = &[
    (
        ActionCategory::Throw,
        &["smash", "throw", "toss", "fling", "摔", "砸", "扔", "丢"],
    ),
    (
        ActionCategory::Attack,
        &[
            "hit", "punch", "kick", "attack", "打人", "打他", "打她", "动手", "揍", "踢", "攻击",
        ],
    ),
    (
        ActionCategory::Work,
        &["work", "code", "write", "do", "finish", "工作", "写", "做", "完成", "代码"],
    ),
    (
        ActionCategory::Slack,
        &["slack off", "rest", "skip", "phone", "摸鱼", "休息", "偷懒", "手机"],
    ),
    (
        ActionCategory::Talk,
        &["say", "ask", "chat", "tell", "说", "问", "聊", "告诉"],
    ),
];

const THROW_BYSTANDER_REACTIONS: &[NpcReaction] =
    &[NpcReaction::Gather, NpcReaction::Flee, NpcReaction::Shock];

const TAUNTS: &[&str] = &["让你再抢我功劳！", "这下舒服了吧？", "忍你很久了！"];

const NOTICE_PROBABILITY: f64 = 0.3;

/// Object name used when the action names nothing visible.
const GENERIC_OBJECT: &str = "东西";

pub fn classify(text: &str) -> ActionCategory {
    let text = text.to_lowercase();
    // Space-padded word view so ASCII keywords never match inside longer words.
    let words = format!(
        " {} ",
        text.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    );

    RULES
        .iter()
        .find(|(_, keywords)| {
            keywords.iter().any(|k| {
                if k.is_ascii() {
                    words.contains(&format!(" {k} "))
                } else {
                    text.contains(k)
                }
            })
        })
        .map(|(category, _)| *category)
        .unwrap_or(ActionCategory::Other)
}

/// Resolve an action against the visible scene.
pub fn interpret(
    action: &str,
    visible_objects: &[String],
    visible_npcs: &[String],
    random: &dyn RandomPort,
) -> ActionOutcome {
    let scene = Scene {
        text: action.to_lowercase(),
        objects: visible_objects,
        npcs: visible_npcs,
    };

    match classify(action) {
        ActionCategory::Throw => throw(&scene, random),
        ActionCategory::Attack => attack(&scene),
        ActionCategory::Work => work(),
        ActionCategory::Slack => slack(&scene, random),
        ActionCategory::Talk => talk(&scene),
        ActionCategory::Other => other(action),
    }
}

struct Scene<'a> {
    text: String,
    objects: &'a [String],
    npcs: &'a [String],
}

impl<'a> Scene<'a> {
    fn mentioned<'s>(&self, names: &'s [String]) -> Option<&'s str> {
        names
            .iter()
            .find(|name| !name.trim().is_empty() && self.text.contains(&name.to_lowercase()))
            .map(String::as_str)
    }

    /// NPCs in view. Blank names are ignored.
    fn present(&self) -> Vec<&'a String> {
        self.npcs
            .iter()
            .filter(|name| !name.trim().is_empty())
            .collect()
    }

    /// The NPC named in the text, else the first one in view.
    fn target(&self) -> Option<&'a str> {
        self.mentioned(self.npcs)
            .or_else(|| self.present().into_iter().next().map(String::as_str))
    }

    fn bystanders(&self, target: &str) -> Vec<&'a String> {
        self.present()
            .into_iter()
            .filter(|name| name.as_str() != target)
            .collect()
    }
}

fn throw(scene: &Scene<'_>, random: &dyn RandomPort) -> ActionOutcome {
    let object = scene.mentioned(scene.objects).unwrap_or(GENERIC_OBJECT);
    let Some(target) = scene.target() else {
        return ActionOutcome::infeasible(format!(
            "你举起{object}，却发现附近一个人都没有，只好悻悻地放下。"
        ));
    };

    let mut outcome = ActionOutcome::feasible(format!(
        "你抄起{object}狠狠砸向{target}！{object}碎了一地，整个办公室瞬间安静了。"
    ));
    outcome.animations = vec![
        AnimationCommand::new(AnimationKind::Throw)
            .with_object(object)
            .with_target(target)
            .with_delay(0),
        AnimationCommand::new(AnimationKind::Hit)
            .with_target(target)
            .with_delay(300),
        AnimationCommand::new(AnimationKind::Debris)
            .with_object(object)
            .with_delay(500),
        AnimationCommand::new(AnimationKind::Hurt)
            .with_target(target)
            .with_delay(700),
    ];

    outcome
        .npc_reactions
        .insert(target.to_string(), NpcReaction::Hurt);
    for name in scene.bystanders(target) {
        let reaction = choose(random, THROW_BYSTANDER_REACTIONS)
            .copied()
            .unwrap_or(NpcReaction::Shock);
        outcome.npc_reactions.insert(name.clone(), reaction);
    }

    outcome.state_changes = StateChanges::new(-30, 50, -20).with_relationship(target, -50);
    outcome.dialogue = choose(random, TAUNTS).map(|t| t.to_string());
    outcome
}

fn attack(scene: &Scene<'_>) -> ActionOutcome {
    let Some(target) = scene.target() else {
        return ActionOutcome::infeasible("你握紧了拳头，但附近没有人，只能对着空气比划两下。");
    };

    let mut outcome =
        ActionOutcome::feasible(format!("你冲向{target}动起了手，场面一度失控。"));
    outcome.animations = vec![
        AnimationCommand::new(AnimationKind::Charge)
            .with_target(target)
            .with_duration(400),
        AnimationCommand::new(AnimationKind::Hurt)
            .with_target(target)
            .with_delay(400),
    ];

    outcome
        .npc_reactions
        .insert(target.to_string(), NpcReaction::Hurt);
    for name in scene.bystanders(target) {
        outcome
            .npc_reactions
            .insert(name.clone(), NpcReaction::Gather);
    }

    outcome.state_changes = StateChanges {
        mood: Some(-40),
        stress: Some(60),
        ..StateChanges::default()
    }
    .with_relationship(target, -80);
    outcome.dialogue = Some(format!("{target}：你疯了吗？！保安！"));
    outcome
}

fn work() -> ActionOutcome {
    let mut outcome = ActionOutcome::feasible("你打开电脑，埋头认真工作了一阵。");
    outcome.animations = vec![AnimationCommand::new(AnimationKind::Work).with_duration(2000)];
    outcome.state_changes = StateChanges::new(-5, 10, 15);
    outcome
}

fn slack(scene: &Scene<'_>, random: &dyn RandomPort) -> ActionOutcome {
    let mut outcome = ActionOutcome::feasible("你悄悄摸起了鱼，难得放松一会儿。");
    outcome.animations = vec![AnimationCommand::new(AnimationKind::Idle).with_duration(2000)];
    outcome.state_changes = StateChanges::new(10, -10, -5);

    if chance(random, NOTICE_PROBABILITY) {
        if let Some(watcher) = choose(random, &scene.present()).copied() {
            outcome
                .npc_reactions
                .insert(watcher.clone(), NpcReaction::Notice);
            outcome.description = format!("你悄悄摸起了鱼，但被{watcher}看在了眼里。");
            outcome.dialogue = Some(format!("{watcher}：上班时间，在忙什么呢？"));
        }
    }

    outcome
}

fn talk(scene: &Scene<'_>) -> ActionOutcome {
    let Some(npc) = scene.mentioned(scene.npcs) else {
        return ActionOutcome::feasible("你自言自语了几句，没有人搭理你。");
    };

    let mut outcome = ActionOutcome::feasible(format!("你走到{npc}身边，和对方聊了起来。"));
    outcome.animations = vec![AnimationCommand::new(AnimationKind::Walk)
        .with_target(npc)
        .with_duration(800)];
    outcome
        .npc_reactions
        .insert(npc.to_string(), NpcReaction::Talk);
    outcome
}

fn other(action: &str) -> ActionOutcome {
    let mut outcome = ActionOutcome::feasible(format!("你尝试{}...", action.trim()));
    outcome.animations = vec![AnimationCommand::new(AnimationKind::Generic).with_duration(1000)];
    outcome
}

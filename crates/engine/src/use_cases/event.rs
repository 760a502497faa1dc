//! Workplace event generation.

use std::sync::Arc;

use serde_json::Value;

use officesbx_domain::coerce::{as_i64, as_text, clamp_delta};
use officesbx_domain::{
    EventChoice, EventEffects, EventKind, EventRequestKind, NpcRoster, PlayerInfo,
    WorkplaceEvent, WorkplaceStatus,
};

use crate::infrastructure::ports::{choose, ChatMessage, LlmPort, RandomPort};
use crate::prompt_templates::{self, PromptKind};

use super::completion::complete;
use super::response_parser::{extract_json, JsonKind};

/// KPI, stress and reputation effects are clamped into this symmetric range.
const STAT_EFFECT_BOUND: i32 = 50;

#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub player: Option<PlayerInfo>,
    pub status: Option<WorkplaceStatus>,
    pub request: EventRequestKind,
}

pub struct WorkplaceEvents {
    roster: Arc<NpcRoster>,
    llm: Option<Arc<dyn LlmPort>>,
    random: Arc<dyn RandomPort>,
    pool: Vec<WorkplaceEvent>,
}

impl WorkplaceEvents {
    pub fn new(
        roster: Arc<NpcRoster>,
        llm: Option<Arc<dyn LlmPort>>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            roster,
            llm,
            random,
            pool: fallback_pool(),
        }
    }

    pub async fn generate(&self, input: &EventInput) -> WorkplaceEvent {
        let status = input.status.clone().unwrap_or_default();
        let system_prompt = prompt_templates::event_system_prompt(
            input.player.as_ref(),
            &status,
            input.request,
            &self.roster.names(),
        );
        let messages = vec![ChatMessage::user(prompt_templates::event_user_prompt(
            input.request,
        ))];

        if let Some(raw) = complete(self.llm.as_ref(), PromptKind::Event, system_prompt, messages).await
        {
            match extract_json(&raw, JsonKind::Object)
                .and_then(|v| self.event_from_value(&v, input.request))
            {
                Some(event) => {
                    tracing::info!(
                        kind = event.kind.as_str(),
                        choices = event.choices.len(),
                        "Generated workplace event"
                    );
                    return event;
                }
                None => tracing::warn!(
                    requested = input.request.as_str(),
                    "Unusable event reply, using fallback"
                ),
            }
        }

        self.fallback_event(input.request)
    }

    /// Uniform pick among pool events of the requested kind.
    fn fallback_event(&self, request: EventRequestKind) -> WorkplaceEvent {
        let candidates: Vec<&WorkplaceEvent> =
            self.pool.iter().filter(|e| request.accepts(e.kind)).collect();

        choose(self.random.as_ref(), &candidates)
            .map(|e| (*e).clone())
            .or_else(|| self.pool.first().cloned())
            .unwrap_or_else(|| WorkplaceEvent {
                id: "quiet_day".to_string(),
                title: "平静的一天".to_string(),
                description: "今天办公室风平浪静。".to_string(),
                kind: EventKind::default(),
                choices: vec![EventChoice::new("继续工作", EventEffects::default())],
            })
    }

    fn event_from_value(&self, value: &Value, request: EventRequestKind) -> Option<WorkplaceEvent> {
        let title = value.get("title").and_then(as_text)?;
        let choices: Vec<EventChoice> = value
            .get("choices")?
            .as_array()?
            .iter()
            .filter_map(choice_from_value)
            .collect();
        if choices.is_empty() {
            return None;
        }

        let kind = value
            .get("type")
            .and_then(as_text)
            .and_then(|raw| EventKind::parse(&raw))
            .or(match request {
                EventRequestKind::Kind(kind) => Some(kind),
                EventRequestKind::Random => None,
            })
            .unwrap_or_default();

        let uuid = self.random.gen_uuid().simple().to_string();
        Some(WorkplaceEvent {
            id: format!("event_{}", &uuid[..8]),
            title,
            description: value
                .get("description")
                .and_then(as_text)
                .unwrap_or_default(),
            kind,
            choices,
        })
    }
}

fn choice_from_value(value: &Value) -> Option<EventChoice> {
    let text = value.get("text").and_then(as_text)?;
    let Some(effects) = value.get("effects") else {
        return Some(EventChoice::new(text, EventEffects::default()));
    };

    let stat = |key: &str| {
        effects
            .get(key)
            .and_then(as_i64)
            .map(|v| clamp_delta(v, STAT_EFFECT_BOUND))
            .unwrap_or(0)
    };
    let mut parsed = EventEffects::new(stat("kpi"), stat("stress"), stat("reputation"));

    if let Some(map) = effects.get("relationship").and_then(Value::as_object) {
        for (npc, delta) in map {
            if let Some(delta) = as_i64(delta) {
                parsed = parsed.with_relationship(npc.clone(), delta);
            }
        }
    }

    Some(EventChoice::new(text, parsed))
}

fn event(
    id: &str,
    kind: EventKind,
    title: &str,
    description: &str,
    choices: Vec<EventChoice>,
) -> WorkplaceEvent {
    WorkplaceEvent {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        kind,
        choices,
    }
}

fn fallback_pool() -> Vec<WorkplaceEvent> {
    use EventKind::*;

    vec![
        event(
            "promotion_opportunity",
            Opportunity,
            "晋升机会",
            "张经理找你谈话，表示有一个晋升机会，但需要你在接下来的项目中表现出色。",
            vec![
                EventChoice::new(
                    "全力以赴争取",
                    EventEffects::new(5, 15, 0).with_relationship("张经理", 5),
                ),
                EventChoice::new(
                    "保持现状，稳扎稳打",
                    EventEffects::new(0, 0, -5).with_relationship("张经理", -5),
                ),
            ],
        ),
        event(
            "mentor_guidance",
            Opportunity,
            "前辈指点",
            "王前辈主动找你，说愿意在工作上指导你。",
            vec![
                EventChoice::new(
                    "虚心接受指导",
                    EventEffects::new(10, 0, 0).with_relationship("王前辈", 10),
                ),
                EventChoice::new(
                    "礼貌婉拒",
                    EventEffects::new(0, 0, 0).with_relationship("王前辈", -10),
                ),
            ],
        ),
        event(
            "performance_bonus",
            Opportunity,
            "绩效奖金",
            "由于上个月表现优秀，公司决定给你发放额外奖金！",
            vec![EventChoice::new("感谢公司", EventEffects::new(0, -5, 5))],
        ),
        event(
            "faction_invite",
            Politics,
            "派系邀请",
            "李同事私下找你，说他们几个新人准备抱团，问你要不要加入。",
            vec![
                EventChoice::new(
                    "加入新人帮",
                    EventEffects::new(0, 0, 0)
                        .with_relationship("李同事", 15)
                        .with_relationship("张经理", -10),
                ),
                EventChoice::new(
                    "委婉拒绝",
                    EventEffects::new(0, 0, 0).with_relationship("李同事", -5),
                ),
                EventChoice::new(
                    "告诉张经理",
                    EventEffects::new(0, 0, -15)
                        .with_relationship("张经理", 10)
                        .with_relationship("李同事", -30),
                ),
            ],
        ),
        event(
            "power_struggle",
            Politics,
            "权力暗斗",
            "你无意中发现张经理和王前辈在争夺一个重要项目的主导权。他们都在拉拢人。",
            vec![
                EventChoice::new(
                    "站队张经理",
                    EventEffects::new(0, 0, 0)
                        .with_relationship("张经理", 20)
                        .with_relationship("王前辈", -25),
                ),
                EventChoice::new(
                    "站队王前辈",
                    EventEffects::new(0, 0, 0)
                        .with_relationship("王前辈", 20)
                        .with_relationship("张经理", -25),
                ),
                EventChoice::new(
                    "保持中立",
                    EventEffects::new(0, 10, 0)
                        .with_relationship("张经理", -5)
                        .with_relationship("王前辈", -5),
                ),
            ],
        ),
        event(
            "gossip",
            Bullying,
            "流言蜚语",
            "你听说有人在背后议论你，说你是靠关系进来的。",
            vec![
                EventChoice::new(
                    "找出造谣者当面对质",
                    EventEffects::new(0, 15, 10).with_relationship("李同事", -10),
                ),
                EventChoice::new("用实力说话，不理会", EventEffects::new(5, 10, 0)),
                EventChoice::new(
                    "向张经理诉苦",
                    EventEffects::new(0, 0, -5).with_relationship("张经理", -5),
                ),
            ],
        ),
        event(
            "credit_stolen",
            Bullying,
            "功劳被抢",
            "你辛苦完成的报告，被同事拿去邀功了。张经理以为是他做的，还表扬了他。",
            vec![
                EventChoice::new(
                    "当众揭穿",
                    EventEffects::new(0, 20, 15).with_relationship("李同事", -40),
                ),
                EventChoice::new(
                    "私下找张经理说明",
                    EventEffects::new(5, 0, 0)
                        .with_relationship("张经理", 5)
                        .with_relationship("李同事", -15),
                ),
                EventChoice::new("忍气吞声", EventEffects::new(-10, 25, -10)),
            ],
        ),
        event(
            "continued_bullying",
            Bullying,
            "变本加厉",
            "看你上次没有反抗，那个同事开始频繁把杂活推给你，还在背后说你坏话。",
            vec![
                EventChoice::new(
                    "忍无可忍，向HR举报",
                    EventEffects::new(0, -20, -5).with_relationship("李同事", -50),
                ),
                EventChoice::new(
                    "寻求王前辈帮助",
                    EventEffects::new(0, -15, 5).with_relationship("王前辈", 10),
                ),
                EventChoice::new("继续忍耐", EventEffects::new(-15, 30, 0)),
            ],
        ),
        event(
            "forced_overtime",
            Bullying,
            "强制加班",
            "张经理要求你这周每天加班到10点，而其他同事却可以正常下班。",
            vec![
                EventChoice::new(
                    "服从安排",
                    EventEffects::new(10, 25, 0).with_relationship("张经理", 5),
                ),
                EventChoice::new(
                    "委婉表示身体不适",
                    EventEffects::new(0, 0, -5).with_relationship("张经理", -15),
                ),
                EventChoice::new(
                    "询问加班费",
                    EventEffects::new(0, 0, 0).with_relationship("张经理", -20),
                ),
            ],
        ),
        event(
            "layoff_rumor",
            Crisis,
            "裁员传闻",
            "公司最近业绩不好，听说要裁员。你的名字出现在了疑似裁员名单上。",
            vec![
                EventChoice::new("拼命表现，争取留下", EventEffects::new(15, 40, 0)),
                EventChoice::new("开始偷偷找下家", EventEffects::new(-10, 20, 0)),
                EventChoice::new(
                    "找张经理打听消息",
                    EventEffects::new(0, 25, 0).with_relationship("张经理", -5),
                ),
            ],
        ),
        event(
            "project_failure",
            Crisis,
            "项目失败",
            "你参与的项目出了大问题，虽然不是你的主要责任，但你也被牵连了。",
            vec![
                EventChoice::new(
                    "主动承担部分责任",
                    EventEffects::new(-15, 0, 15).with_relationship("张经理", 10),
                ),
                EventChoice::new(
                    "撇清关系",
                    EventEffects::new(0, 0, -20).with_relationship("李同事", -20),
                ),
                EventChoice::new(
                    "提出改进方案",
                    EventEffects::new(5, 0, 10).with_relationship("张经理", 15),
                ),
            ],
        ),
    ]
}

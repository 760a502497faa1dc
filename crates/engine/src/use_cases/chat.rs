//! NPC dialogue.

use std::sync::Arc;

use officesbx_domain::coerce::{as_i64, as_text, clamp_delta};
use officesbx_domain::{
    ChatTurn, Emotion, KpiTier, NpcReply, NpcRoster, PlayerInfo, WorkplaceStatus,
    RELATIONSHIP_CHANGE_BOUND,
};

use crate::infrastructure::ports::{choose, ChatMessage, LlmPort, RandomPort};
use crate::prompt_templates::{self, PromptKind, CHAT_HISTORY_LIMIT};

use super::completion::complete;
use super::response_parser::split_prose;

/// Largest swing the offline fallback ever applies.
const FALLBACK_CHANGE_BOUND: i32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("NPC {0} 不存在")]
    NpcNotFound(String),
}

#[derive(Debug, Clone)]
pub struct ChatInput {
    pub npc_name: String,
    pub player_message: String,
    pub history: Vec<ChatTurn>,
    pub player: Option<PlayerInfo>,
    pub status: Option<WorkplaceStatus>,
}

pub struct NpcChat {
    roster: Arc<NpcRoster>,
    llm: Option<Arc<dyn LlmPort>>,
    random: Arc<dyn RandomPort>,
}

impl NpcChat {
    pub fn new(
        roster: Arc<NpcRoster>,
        llm: Option<Arc<dyn LlmPort>>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self { roster, llm, random }
    }

    pub async fn reply(&self, input: ChatInput) -> Result<NpcReply, ChatError> {
        let npc = self
            .roster
            .get(&input.npc_name)
            .ok_or_else(|| ChatError::NpcNotFound(input.npc_name.clone()))?;

        let system_prompt =
            prompt_templates::chat_system_prompt(npc, input.player.as_ref(), input.status.as_ref());
        let mut messages = prompt_templates::history_messages(&input.history, CHAT_HISTORY_LIMIT);
        messages.push(ChatMessage::user(input.player_message.clone()));

        if let Some(raw) = complete(self.llm.as_ref(), PromptKind::Chat, system_prompt, messages).await
        {
            if let Some(reply) = parse_reply(&raw) {
                tracing::info!(
                    npc = %npc.name,
                    emotion = %reply.emotion,
                    relationship_change = reply.relationship_change,
                    "NPC replied"
                );
                return Ok(reply);
            }
            tracing::warn!(npc = %npc.name, "Model reply had no dialogue, using fallback");
        }

        Ok(self.fallback_reply(&npc.name, input.status.as_ref()))
    }

    fn fallback_reply(&self, npc_name: &str, status: Option<&WorkplaceStatus>) -> NpcReply {
        let status = status.cloned().unwrap_or_default();
        let lines = fallback_lines(npc_name, status.kpi_tier());

        let mut change = self.random.gen_range(-1, 2);
        if status.reputation < -20 {
            change -= 2;
        } else if status.reputation > 20 {
            change += 1;
        }

        NpcReply {
            npc_response: choose(self.random.as_ref(), lines)
                .copied()
                .unwrap_or("嗯。")
                .to_string(),
            emotion: Emotion::Neutral,
            relationship_change: clamp_delta(i64::from(change), FALLBACK_CHANGE_BOUND),
        }
    }
}

/// Prose plus optional trailing `{"emotion", "relationship_change"}` metadata.
/// `None` when the model produced no dialogue at all.
fn parse_reply(raw: &str) -> Option<NpcReply> {
    let (prose, meta) = split_prose(raw);
    if prose.is_empty() {
        return None;
    }

    let mut reply = NpcReply::neutral(prose);
    if let Some(meta) = meta {
        if let Some(emotion) = meta.get("emotion").and_then(as_text) {
            reply.emotion = Emotion::parse_lenient(&emotion);
        }
        if let Some(change) = meta.get("relationship_change").and_then(as_i64) {
            reply.relationship_change = clamp_delta(change, RELATIONSHIP_CHANGE_BOUND);
        }
    }
    Some(reply)
}

/// Canned lines per NPC and KPI band. Unknown names borrow 李同事's.
fn fallback_lines(npc_name: &str, tier: KpiTier) -> &'static [&'static str] {
    match (npc_name, tier) {
        ("张经理", KpiTier::High) => &["工作不错，继续保持。", "有潜力，好好干。"],
        ("张经理", KpiTier::Medium) => &["工作要更上心一点。", "下周有个项目，做好准备。"],
        ("张经理", KpiTier::Low) => &["你的KPI有点问题，要抓紧了。", "最近状态不太好啊。"],
        ("王前辈", KpiTier::High) => &["年轻人，不错，有前途。", "有什么问题尽管问。"],
        ("王前辈", KpiTier::Medium) => &["慢慢来，职场路很长。", "这个问题嘛...我给你讲讲。"],
        ("王前辈", KpiTier::Low) => &["做人做事都要稳重。", "年轻人要沉淀。"],
        (_, KpiTier::High) => &["哇，最近混得不错嘛！", "请我吃饭呗，庆祝一下~"],
        (_, KpiTier::Medium) => &["嘿，新来的！有空聊聊？", "食堂红烧肉不错，一起去？"],
        (_, KpiTier::Low) => &["啊...你好。", "我有点忙，回头聊。"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::infrastructure::ports::{MessageRole, MockLlmPort};
    use crate::use_cases::completion::testing::ScriptedLlm;

    fn input(npc: &str) -> ChatInput {
        ChatInput {
            npc_name: npc.to_string(),
            player_message: "经理，报告我写完了".to_string(),
            history: Vec::new(),
            player: None,
            status: None,
        }
    }

    fn chat(llm: Option<Arc<dyn LlmPort>>, random: FixedRandom) -> NpcChat {
        NpcChat::new(Arc::new(NpcRoster::office_default()), llm, Arc::new(random))
    }

    #[tokio::test]
    async fn unknown_npc_is_an_error() {
        let err = chat(None, FixedRandom(0, 0.0))
            .reply(input("赵总"))
            .await
            .unwrap_err();
        assert_eq!(err, ChatError::NpcNotFound("赵总".to_string()));
    }

    #[tokio::test]
    async fn unknown_npc_never_reaches_the_model() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().never();
        let result = chat(Some(Arc::new(llm)), FixedRandom(0, 0.0))
            .reply(input("赵总"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn parses_prose_and_clamps_relationship() {
        let llm = ScriptedLlm::replying(
            "<think>他在邀功</think>放那吧，我晚点看。\n{\"emotion\": \"contempt\", \"relationship_change\": 37}",
        );
        let reply = chat(Some(llm), FixedRandom(0, 0.0))
            .reply(input("张经理"))
            .await
            .unwrap();
        assert_eq!(reply.npc_response, "放那吧，我晚点看。");
        assert_eq!(reply.emotion, Emotion::Contempt);
        assert_eq!(reply.relationship_change, 10);
    }

    #[tokio::test]
    async fn negative_change_clamps_and_strings_coerce() {
        let llm = ScriptedLlm::replying("滚。{\"emotion\": \"furious\", \"relationship_change\": \"-99\"}");
        let reply = chat(Some(llm), FixedRandom(0, 0.0))
            .reply(input("李同事"))
            .await
            .unwrap();
        assert_eq!(reply.emotion, Emotion::Neutral);
        assert_eq!(reply.relationship_change, -10);
    }

    #[tokio::test]
    async fn text_without_braces_is_neutral() {
        let llm = ScriptedLlm::replying("嗯，知道了。");
        let reply = chat(Some(llm), FixedRandom(0, 0.0))
            .reply(input("王前辈"))
            .await
            .unwrap();
        assert_eq!(reply, NpcReply::neutral("嗯，知道了。"));
    }

    #[tokio::test]
    async fn sends_system_prompt_and_trimmed_history() {
        let scripted = ScriptedLlm::replying("好。");
        let mut request = input("张经理");
        request.history = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::player(format!("p{i}"))
                } else {
                    ChatTurn::npc("张经理", format!("n{i}"))
                }
            })
            .collect();

        chat(Some(scripted.clone()), FixedRandom(0, 0.0))
            .reply(request)
            .await
            .unwrap();

        let sent = scripted.last_request();
        assert_eq!(sent.messages.len(), CHAT_HISTORY_LIMIT + 1);
        assert_eq!(sent.messages[0].content, "p4");
        let last = sent.messages.last().unwrap();
        assert_eq!(last.role, MessageRole::User);
        assert_eq!(last.content, "经理，报告我写完了");
        assert!(sent.system_prompt.unwrap().contains("张经理"));
        assert_eq!(sent.max_tokens, Some(300));
    }

    #[tokio::test]
    async fn upstream_failure_uses_tiered_fallback() {
        let mut request = input("张经理");
        request.status = Some(WorkplaceStatus {
            kpi: 40,
            ..WorkplaceStatus::default()
        });
        let reply = chat(Some(ScriptedLlm::failing()), FixedRandom(0, 0.0))
            .reply(request)
            .await
            .unwrap();
        assert_eq!(reply.npc_response, "你的KPI有点问题，要抓紧了。");
        assert_eq!(reply.emotion, Emotion::Neutral);
        assert_eq!(reply.relationship_change, 0);
    }

    #[tokio::test]
    async fn fallback_change_follows_reputation() {
        let mut request = input("王前辈");
        request.status = Some(WorkplaceStatus {
            reputation: -30,
            ..WorkplaceStatus::default()
        });
        // gen_range yields -1, reputation penalty -2
        let reply = chat(None, FixedRandom(-1, 0.0)).reply(request.clone()).await.unwrap();
        assert_eq!(reply.relationship_change, -3);

        request.status = Some(WorkplaceStatus {
            reputation: 50,
            ..WorkplaceStatus::default()
        });
        let reply = chat(None, FixedRandom(2, 0.0)).reply(request).await.unwrap();
        assert_eq!(reply.relationship_change, 3);
    }

    #[tokio::test]
    async fn empty_model_reply_falls_back() {
        let llm = ScriptedLlm::replying("<think>只有思考</think>");
        let reply = chat(Some(llm), FixedRandom(0, 0.0))
            .reply(input("李同事"))
            .await
            .unwrap();
        assert_eq!(reply.npc_response, "嘿，新来的！有空聊聊？");
    }

    #[test]
    fn fallback_lines_cover_every_tier() {
        for tier in [KpiTier::High, KpiTier::Medium, KpiTier::Low] {
            assert_eq!(fallback_lines("路人甲", tier), fallback_lines("李同事", tier));
            assert!(!fallback_lines("张经理", tier).is_empty());
        }
    }
}

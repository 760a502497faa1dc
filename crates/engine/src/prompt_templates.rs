//! Prompt builders for every request kind sent to the hosted model.
//!
//! Each builder is a pure string assembly over already-deserialized request
//! data. Free text from the client is interpolated verbatim.

use officesbx_domain::{
    CandidateProfile, ChatTurn, CompanyBrief, EventRequestKind, InterviewMode, InterviewRound,
    JobBrief, NpcProfile, PlayerInfo, WorkplaceStatus,
};

use crate::infrastructure::ports::ChatMessage;

/// The request kinds that reach the model, each with its own generation budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Chat,
    Tasks,
    Jobs,
    Interview,
    Event,
    Action,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Tasks => "tasks",
            Self::Jobs => "jobs",
            Self::Interview => "interview",
            Self::Event => "event",
            Self::Action => "action",
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::Chat => 300,
            Self::Tasks => 800,
            Self::Jobs => 4000,
            Self::Interview => 800,
            Self::Event => 600,
            Self::Action => 600,
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            Self::Chat => 0.8,
            Self::Tasks => 0.7,
            Self::Jobs => 0.8,
            Self::Interview => 0.8,
            Self::Event => 0.9,
            Self::Action => 0.7,
        }
    }
}

/// Number of trailing history turns sent with a chat request.
pub const CHAT_HISTORY_LIMIT: usize = 6;

/// Convert the last `limit` turns into role-tagged messages. Player turns go on
/// the user side; everything else is treated as the assistant's.
pub fn history_messages(turns: &[ChatTurn], limit: usize) -> Vec<ChatMessage> {
    let start = turns.len().saturating_sub(limit);
    turns[start..]
        .iter()
        .map(|turn| {
            if turn.is_player() {
                ChatMessage::user(turn.content.clone())
            } else {
                ChatMessage::assistant(turn.content.clone())
            }
        })
        .collect()
}

/// Bullet list describing the player, extended with workplace standing when known.
pub fn format_player_info(player: Option<&PlayerInfo>, status: Option<&WorkplaceStatus>) -> String {
    let Some(player) = player else {
        return "新入职员工".to_string();
    };

    let mut info = format!(
        "- 姓名: {}\n- 职位: {}\n- 入职天数: 第{}天",
        player.name, player.position, player.day
    );

    if let Some(status) = status {
        info.push_str(&format!(
            "\n- KPI分数: {}\n- 压力值: {}\n- 名声: {}\n- 所属派系: {}",
            status.kpi,
            status.stress,
            status.reputation,
            status.faction_label()
        ));
    }

    info
}

pub fn chat_system_prompt(
    npc: &NpcProfile,
    player: Option<&PlayerInfo>,
    status: Option<&WorkplaceStatus>,
) -> String {
    format!(
        r#"你是一个职场模拟游戏中的 NPC，名叫"{name}"。

【角色设定】
- 职位：{position}
- 性格：{personality}
- 说话风格：{style}
- 派系倾向：{faction}

【游戏背景】
这是一个真实的职场沙盒游戏，包含：
- 办公室政治：派系斗争、站队、拉拢、排挤
- 职场晋升：KPI考核、绩效评估、升职竞争
- 职场阴暗面：抢功、甩锅、背后议论、职场霸凌
- 人际关系：好感度影响对话态度和帮助意愿

【玩家信息】
{player}

【回复要求】
1. 保持角色性格一致，要符合真实职场
2. 根据玩家的职场状态（KPI、压力、好感度）调整态度
3. 可以适当透露办公室政治信息、暗示站队利弊、表达对玩家的真实看法（可以是负面的）；如果好感度低，可以冷淡或敷衍
4. 回复要简洁自然，像真实职场对话（2-4句话）
5. 在回复末尾用 JSON 格式标注：
   {{"emotion": "happy|neutral|angry|sad|surprised|contempt|jealous", "relationship_change": -10到+10}}

【重要】不要输出 <think> 标签或思考过程，直接输出对话内容。"#,
        name = npc.name,
        position = npc.position,
        personality = npc.personality,
        style = npc.speaking_style,
        faction = npc.faction,
        player = format_player_info(player, status),
    )
}

pub fn tasks_system_prompt(player: &PlayerInfo, current_time: &str) -> String {
    format!(
        r#"你是一个职场模拟游戏的任务生成器。

【玩家信息】
- 姓名: {name}
- 职位: {position}
- 入职天数: 第{day}天
- 当前时间: {current_time}

【任务生成要求】
生成3-5个真实的工作任务，要有职场真实性：
1. 可能包含"帮上司完成私活"等灰色任务
2. 有时间紧迫的紧急任务
3. 可能有需要与讨厌的同事合作的任务
4. 奖励要符合难度

用 JSON 格式返回：
{{
    "daily_message": "每日问候语（可以是讽刺或现实的）",
    "tasks": [
        {{
            "id": "task_001",
            "title": "任务标题",
            "description": "详细描述",
            "difficulty": "easy|medium|hard",
            "reward": 奖励金额,
            "deadline": "截止时间",
            "type": "document|meeting|communication|emergency"
        }}
    ]
}}

不要输出思考过程，直接输出JSON。"#,
        name = player.name,
        position = player.position,
        day = player.day,
    )
}

pub const TASKS_USER_PROMPT: &str = "请为今天生成工作任务";

pub fn jobs_system_prompt(candidate: &CandidateProfile, count: usize) -> String {
    format!(
        r#"你是一个职场模拟游戏的招聘职位生成器。

【玩家背景】
- 姓名: {name}
- 学历: {education}
- 专业: {major}
- 经验: {experience}年
- 技能: {skills}

【生成要求】
请生成 {count} 个招聘职位信息。
这些职位应该围绕玩家背景，但也要有一定的随机性和真实感。
包含：
1. 知名大厂、中型企业、初创公司、外企、甚至不靠谱的小公司。
2. 职位不仅限于技术，也可以有管理、销售、甚至一些奇怪的兼职。
3. 薪资要符合公司类型和要求。
4. 包含职位描述、任职要求、公司福利。

【返回格式】
必须返回一个包含 {count} 个对象的 JSON 数组。
对象格式：
{{
    "id": "job_随机ID",
    "company": {{
        "name": "公司名称",
        "type": "large|mid|startup|foreign|small",
        "industry": "行业",
        "size": "公司规模",
        "reputation": 1-5,
        "difficulty": 1-5,
        "salaryLevel": 1-5,
        "description": "公司简介"
    }},
    "position": {{
        "title": "职位名称",
        "department": "所属部门",
        "salaryRange": [最低月薪, 最高月薪],
        "requirements": ["要求1", "要求2", "要求3"],
        "benefits": ["福利1", "福利2"],
        "workType": "onsite|remote|hybrid",
        "experience": "经验要求(如: 1-3年)",
        "education": "学历要求(如: 本科)",
        "headcount": 招聘人数,
        "urgency": "normal|urgent|asap"
    }}
}}

不要输出思考过程，直接输出 JSON 数组。"#,
        name = candidate.name,
        education = candidate.education,
        major = candidate.major,
        experience = candidate.experience,
        skills = candidate.skills_or("JavaScript"),
    )
}

pub fn jobs_user_prompt(count: usize) -> String {
    format!("请生成 {count} 个招聘职位")
}

pub fn interview_system_prompt(
    mode: InterviewMode,
    candidate: &CandidateProfile,
    company: &CompanyBrief,
    job: &JobBrief,
    round: &InterviewRound,
) -> String {
    let background = format!(
        r#"你是一个职场模拟游戏的 AI 面试官。

【面试背景】
- 公司: {company} ({company_kind})
- 职位: {title}
- 面试轮次: 第 {round} 轮
- 面试官身份: {role}
- 压力面试模式: {pressure}

【候选人背景】
- 姓名: {name}
- 学历: {education}
- 经验: {experience}年
- 技能: {skills}"#,
        company = company.name,
        company_kind = company.kind,
        title = job.title,
        round = round.round,
        role = round.interviewer_role,
        pressure = if round.is_pressure { "是" } else { "否" },
        name = candidate.name,
        education = candidate.education,
        experience = candidate.experience,
        skills = candidate.skills.join(", "),
    );

    let instructions = match mode {
        InterviewMode::Full => {
            r#"【生成要求】
1. 先点评候选人上一轮的回答（如果有），指出亮点和不足，写入 analysis 字段。
2. 再根据当前背景和历史对话，生成下一个专业的面试问题。问题要真实、有针对性；如果是压力面，问题要犀利、挑剔。
3. 同时生成一个【示例回答】。示例回答必须是候选人（玩家）的回答，而不是面试官的问题；要高质量、逻辑清晰，充分展示候选人的背景优势，不要重复面试官的问题。
4. 返回格式必须为 JSON。

【返回格式】
{
    "analysis": "对上一轮回答的点评",
    "question": "面试官的问题内容",
    "sample_answer": "给玩家参考的示例回答",
    "type": "technical|behavioral|personal|stress",
    "display_type": "问题分类名(如: 技术理解)"
}"#
        }
        InterviewMode::Question => {
            r#"【生成要求】
1. 根据当前背景和历史对话，生成一个专业的面试问题。
2. 问题要真实、有针对性。如果是压力面，问题要犀利、挑剔。
3. 同时生成一个【示例回答】。示例回答必须是候选人（玩家）的回答，而不是面试官的问题；要高质量、逻辑清晰，充分展示候选人的背景优势，不要重复面试官的问题。
4. 返回格式必须为 JSON。

【返回格式】
{
    "question": "面试官的问题内容",
    "sample_answer": "给玩家参考的示例回答",
    "type": "technical|behavioral|personal|stress",
    "display_type": "问题分类名(如: 技术理解)"
}"#
        }
        InterviewMode::Analysis => {
            r#"【生成要求】
只点评候选人最近一次的回答：指出亮点、不足和改进建议，语气符合面试官身份。不要提出新问题。
返回格式必须为 JSON。

【返回格式】
{
    "analysis": "对候选人回答的点评"
}"#
        }
    };

    format!("{background}\n\n{instructions}\n\n不要输出思考过程，直接输出 JSON。")
}

/// Fallback user turn when the client sends no history.
pub const INTERVIEW_OPENING_PROMPT: &str = "面试开始，请提出问题。";

pub fn event_system_prompt(
    player: Option<&PlayerInfo>,
    status: &WorkplaceStatus,
    request: EventRequestKind,
    npc_names: &[&str],
) -> String {
    let position = player.map(|p| p.position.as_str()).unwrap_or("实习生");
    format!(
        r#"你是职场事件生成器。生成一个真实的职场事件。

【玩家状态】
- 职位: {position}
- KPI: {kpi}
- 压力: {stress}
- 名声: {reputation}

【事件类型】{kind}

【办公室同事】{npcs}

【要求】
生成一个有选择的职场事件，要真实、有后果。可以是：
- 办公室政治（站队、拉拢、打小报告）
- 职场霸凌（抢功、孤立、言语攻击）
- 机会事件（晋升、加薪、重要项目）
- 危机事件（背锅、裁员、投诉）

用 JSON 格式返回：
{{
    "title": "事件标题",
    "description": "事件描述",
    "type": "politics|bullying|opportunity|crisis",
    "choices": [
        {{
            "text": "选项文字",
            "effects": {{
                "kpi": 变化值,
                "stress": 变化值,
                "reputation": 变化值,
                "relationship": {{"npc名": -10到10的变化值}}
            }}
        }}
    ]
}}"#,
        kpi = status.kpi,
        stress = status.stress,
        reputation = status.reputation,
        kind = request.as_str(),
        npcs = npc_names.join("、"),
    )
}

pub fn event_user_prompt(request: EventRequestKind) -> String {
    format!("生成一个{}类型的职场事件", request.as_str())
}

pub fn action_system_prompt(
    player: Option<&PlayerInfo>,
    status: Option<&WorkplaceStatus>,
    visible_objects: &[String],
    visible_npcs: &[String],
) -> String {
    let list = |items: &[String]| {
        if items.is_empty() {
            "无".to_string()
        } else {
            items.join("、")
        }
    };

    format!(
        r#"你是职场沙盒游戏的行动裁判。玩家会用一句话描述想做的事，你要判断能否做到，并给出动画和后果。

【玩家信息】
{player}

【场景】
- 可见物品: {objects}
- 可见同事: {npcs}

【规则】
1. 只能使用场景中可见的物品和同事；对不存在的目标，feasible 为 false 并说明原因。
2. 后果要符合真实职场：暴力行为会严重影响心情、压力和人际关系。
3. 动画按播放顺序给出，时间单位为毫秒。

用 JSON 格式返回：
{{
    "feasible": true,
    "description": "对行动结果的描述",
    "animations": [
        {{"type": "throw|hit|debris|hurt|dodge|charge|work|idle|walk|generic", "target": "同事名(可选)", "object": "物品名(可选)", "duration": 毫秒(可选), "delay": 毫秒(可选)}}
    ],
    "npc_reactions": {{"同事名": "hurt|dodge|gather|flee|shock|notice|talk"}},
    "state_changes": {{
        "mood": 变化值,
        "stress": 变化值,
        "work_progress": 变化值,
        "relationships": {{"同事名": 变化值}}
    }},
    "dialogue": "相关人物说的一句话，没有则为 null"
}}

不要输出思考过程，直接输出JSON。"#,
        player = format_player_info(player, status),
        objects = list(visible_objects),
        npcs = list(visible_npcs),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MessageRole;
    use officesbx_domain::NpcRoster;

    #[test]
    fn history_keeps_only_the_tail_and_maps_roles() {
        let turns = vec![
            ChatTurn::player("1"),
            ChatTurn::npc("张经理", "2"),
            ChatTurn::player("3"),
            ChatTurn::npc("张经理", "4"),
            ChatTurn::player("5"),
        ];
        let messages = history_messages(&turns, 2);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::assistant("4"));
        assert_eq!(messages[1].role, MessageRole::User);

        assert_eq!(history_messages(&turns, 10).len(), 5);
        assert!(history_messages(&[], 4).is_empty());
    }

    #[test]
    fn player_info_includes_status_only_when_present() {
        let player = PlayerInfo {
            day: 3,
            ..PlayerInfo::new("小明")
        };
        let plain = format_player_info(Some(&player), None);
        assert!(plain.contains("第3天"));
        assert!(!plain.contains("KPI"));

        let status = WorkplaceStatus::default();
        let full = format_player_info(Some(&player), Some(&status));
        assert!(full.contains("KPI分数: 60"));
        assert!(full.contains("所属派系: 无"));

        assert_eq!(format_player_info(None, Some(&status)), "新入职员工");
    }

    #[test]
    fn chat_prompt_carries_npc_profile() {
        let roster = NpcRoster::office_default();
        let npc = roster.get("王前辈").unwrap();
        let prompt = chat_system_prompt(npc, None, None);
        assert!(prompt.contains("名叫\"王前辈\""));
        assert!(prompt.contains("元老派"));
        assert!(prompt.contains("relationship_change"));
    }

    #[test]
    fn interview_prompt_varies_by_mode() {
        let candidate = CandidateProfile::default();
        let company = CompanyBrief::default();
        let job = JobBrief::default();
        let round = InterviewRound {
            is_pressure: true,
            ..InterviewRound::default()
        };

        let full = interview_system_prompt(InterviewMode::Full, &candidate, &company, &job, &round);
        assert!(full.contains("\"analysis\""));
        assert!(full.contains("\"question\""));
        assert!(full.contains("压力面试模式: 是"));

        let question =
            interview_system_prompt(InterviewMode::Question, &candidate, &company, &job, &round);
        assert!(!question.contains("\"analysis\""));

        let analysis =
            interview_system_prompt(InterviewMode::Analysis, &candidate, &company, &job, &round);
        assert!(!analysis.contains("\"sample_answer\""));
        assert!(analysis.contains("某公司 (中型企业)"));
    }

    #[test]
    fn action_prompt_lists_scene() {
        let prompt = action_system_prompt(None, None, &["水杯".to_string()], &[]);
        assert!(prompt.contains("可见物品: 水杯"));
        assert!(prompt.contains("可见同事: 无"));
    }

    #[test]
    fn generation_budgets() {
        assert_eq!(PromptKind::Chat.max_tokens(), 300);
        assert_eq!(PromptKind::Jobs.max_tokens(), 4000);
        assert_eq!(PromptKind::Event.temperature(), 0.9);
        assert_eq!(PromptKind::Tasks.temperature(), 0.7);
    }
}

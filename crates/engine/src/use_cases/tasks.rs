//! Daily task generation.

use std::sync::Arc;

use serde_json::Value;

use officesbx_domain::coerce::{as_f64, as_text};
use officesbx_domain::{DailyTasks, PlayerInfo, Task, TaskDifficulty, TaskKind};

use crate::infrastructure::ports::{choose, ChatMessage, LlmPort, RandomPort};
use crate::prompt_templates::{self, PromptKind, TASKS_USER_PROMPT};

use super::completion::complete;
use super::response_parser::{extract_json, JsonKind};

const DAILY_MESSAGES: &[&str] = &[
    "又是元气满满的一天！（才怪）",
    "今天任务有点多，加油打工人。",
    "听说今天有重要会议，别迟到。",
];

pub struct DailyTaskPlanner {
    llm: Option<Arc<dyn LlmPort>>,
    random: Arc<dyn RandomPort>,
}

impl DailyTaskPlanner {
    pub fn new(llm: Option<Arc<dyn LlmPort>>, random: Arc<dyn RandomPort>) -> Self {
        Self { llm, random }
    }

    pub async fn plan(&self, player: &PlayerInfo, current_time: &str) -> DailyTasks {
        let system_prompt = prompt_templates::tasks_system_prompt(player, current_time);
        let messages = vec![ChatMessage::user(TASKS_USER_PROMPT)];

        if let Some(raw) = complete(self.llm.as_ref(), PromptKind::Tasks, system_prompt, messages).await
        {
            match extract_json(&raw, JsonKind::Object).and_then(|v| daily_tasks_from_value(&v)) {
                Some(daily) => {
                    tracing::info!(player = %player.name, tasks = daily.tasks.len(), "Generated daily tasks");
                    return daily;
                }
                None => tracing::warn!(player = %player.name, "Unusable task reply, using fallback"),
            }
        }

        self.fallback_tasks()
    }

    fn fallback_tasks(&self) -> DailyTasks {
        DailyTasks {
            daily_message: choose(self.random.as_ref(), DAILY_MESSAGES)
                .copied()
                .unwrap_or(DAILY_MESSAGES[0])
                .to_string(),
            tasks: vec![
                Task::new(
                    "task_001",
                    "完成季度报告初稿",
                    "整理本季度的销售数据，完成报告初稿。张经理要看。",
                )
                .with_difficulty(TaskDifficulty::Medium)
                .with_reward(200.0)
                .with_deadline("17:00")
                .with_kind(TaskKind::Document),
                Task::new(
                    "task_002",
                    "参加项目周会",
                    "下午3点在会议室B，注意别抢李同事的风头。",
                )
                .with_difficulty(TaskDifficulty::Easy)
                .with_reward(50.0)
                .with_deadline("15:00")
                .with_kind(TaskKind::Meeting),
                Task::new("task_003", "回复客户邮件", "有3封客户询问邮件需要回复，别写错了。")
                    .with_difficulty(TaskDifficulty::Easy)
                    .with_reward(80.0)
                    .with_deadline("12:00")
                    .with_kind(TaskKind::Communication),
            ],
        }
    }
}

/// Lenient conversion; `None` when no task survives.
fn daily_tasks_from_value(value: &Value) -> Option<DailyTasks> {
    let tasks: Vec<Task> = value
        .get("tasks")?
        .as_array()?
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| task_from_value(i, raw))
        .collect();

    if tasks.is_empty() {
        return None;
    }

    Some(DailyTasks {
        tasks,
        daily_message: value
            .get("daily_message")
            .and_then(as_text)
            .unwrap_or_else(|| DAILY_MESSAGES[1].to_string()),
    })
}

fn task_from_value(index: usize, raw: &Value) -> Option<Task> {
    let title = raw.get("title").and_then(as_text)?;
    let text = |key: &str| raw.get(key).and_then(as_text);

    let mut task = Task::new(
        text("id").unwrap_or_else(|| format!("task_{:03}", index + 1)),
        title,
        text("description").unwrap_or_default(),
    )
    .with_difficulty(TaskDifficulty::parse_lenient(&text("difficulty").unwrap_or_default()))
    .with_reward(raw.get("reward").and_then(as_f64).unwrap_or(0.0))
    .with_kind(TaskKind::parse_lenient(&text("type").unwrap_or_default()));

    if let Some(deadline) = text("deadline") {
        task = task.with_deadline(deadline);
    }
    Some(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::use_cases::completion::testing::ScriptedLlm;

    fn planner(llm: Option<Arc<dyn LlmPort>>) -> DailyTaskPlanner {
        DailyTaskPlanner::new(llm, Arc::new(FixedRandom(0, 0.0)))
    }

    #[tokio::test]
    async fn without_model_serves_three_mock_tasks() {
        let daily = planner(None).plan(&PlayerInfo::new("小明"), "09:00").await;
        assert_eq!(daily.tasks.len(), 3);
        assert_eq!(daily.tasks[0].id, "task_001");
        assert_eq!(daily.tasks[1].kind, TaskKind::Meeting);
        assert_eq!(daily.daily_message, DAILY_MESSAGES[0]);
        assert!(daily.tasks.iter().all(|t| t.reward >= 0.0));
    }

    #[tokio::test]
    async fn parses_and_coerces_model_tasks() {
        let llm = ScriptedLlm::replying(
            r#"今天的任务如下：
```json
{
  "daily_message": "老板今天心情不好",
  "tasks": [
    {"id": "t1", "title": "帮经理写私活", "difficulty": "HARD", "reward": "300", "deadline": "20:00", "type": "emergency"},
    {"title": "整理会议纪要", "reward": -50, "type": "paperwork"},
    {"description": "没有标题的任务会被丢弃"}
  ]
}
```"#,
        );
        let daily = planner(Some(llm)).plan(&PlayerInfo::new("小明"), "10:30").await;

        assert_eq!(daily.daily_message, "老板今天心情不好");
        assert_eq!(daily.tasks.len(), 2);

        let first = &daily.tasks[0];
        assert_eq!(first.difficulty, TaskDifficulty::Hard);
        assert_eq!(first.reward, 300.0);
        assert_eq!(first.kind, TaskKind::Emergency);

        let second = &daily.tasks[1];
        assert_eq!(second.id, "task_002");
        assert_eq!(second.reward, 0.0);
        assert_eq!(second.kind, TaskKind::Document);
        assert_eq!(second.deadline, "18:00");
    }

    #[tokio::test]
    async fn prompt_mentions_current_time() {
        let scripted = ScriptedLlm::replying("{}");
        planner(Some(scripted.clone()))
            .plan(&PlayerInfo::new("小明"), "14:00")
            .await;
        let request = scripted.last_request();
        assert!(request.system_prompt.unwrap().contains("当前时间: 14:00"));
        assert_eq!(request.messages[0].content, TASKS_USER_PROMPT);
    }

    #[tokio::test]
    async fn empty_task_list_falls_back() {
        let llm = ScriptedLlm::replying(r#"{"daily_message": "无事", "tasks": []}"#);
        let daily = planner(Some(llm)).plan(&PlayerInfo::new("小明"), "09:00").await;
        assert_eq!(daily.tasks.len(), 3);
    }
}

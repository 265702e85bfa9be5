//! Pullストリーム集約
//!
//! `POST /api/pull` のレスポンスボディは改行区切りJSON（NDJSON）のステータス列。
//! チャンク境界と行境界は一致しないため、バイト列をバッファリングして
//! 完結した行だけを1レコードずつデコードする。
//!
//! 状態遷移: `Idle → Requesting → Streaming → Completed | Failed`
//! （`Completed` と `Failed` は終端状態で、以降の入力はすべて無視される）

use futures::{Stream, StreamExt};
use ollama_gateway_common::{
    error::{GatewayError, GatewayResult},
    protocol::{AggregatedPullResult, PullRecord, PullStatus},
};
use std::fmt::Display;

/// 集約の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullPhase {
    /// リクエスト送信前
    #[default]
    Idle,
    /// リクエスト送信済み、最初のバイト待ち
    Requesting,
    /// チャンク受信・デコード中
    Streaming,
    /// ストリーム終端まで正常に受信
    Completed,
    /// 転送エラーまたは不正なレコード
    Failed,
}

impl PullPhase {
    /// 終端状態か
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// 集約中に観測されるイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullEvent {
    /// 1レコード分の進捗
    Progress(PullStatus),
    /// ストリーム終端（集約結果）
    Completed(AggregatedPullResult),
}

/// NDJSONステータスストリームの集約器
#[derive(Debug, Default)]
pub struct StreamAggregator {
    phase: PullPhase,
    buffer: Vec<u8>,
    input_closed: bool,
    result: AggregatedPullResult,
}

impl StreamAggregator {
    /// Idle状態の集約器を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の状態
    pub fn phase(&self) -> PullPhase {
        self.phase
    }

    /// リクエスト送信を記録（Idle → Requesting）
    pub fn begin_request(&mut self) {
        if self.phase == PullPhase::Idle {
            self.phase = PullPhase::Requesting;
        }
    }

    /// 受信したチャンクをバッファに追加する
    ///
    /// 終端状態、または入力クローズ後のチャンクは無視される。
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        if self.phase.is_terminal() || self.input_closed {
            return;
        }
        self.phase = PullPhase::Streaming;
        self.buffer.extend_from_slice(chunk);
    }

    /// ストリーム終端を記録する
    ///
    /// 改行で終わっていない末尾の行は最後のレコードとして扱う。
    pub fn close_input(&mut self) {
        if self.phase.is_terminal() || self.input_closed {
            return;
        }
        self.phase = PullPhase::Streaming;
        if self.buffer.last().is_some_and(|b| *b != b'\n') {
            self.buffer.push(b'\n');
        }
        self.input_closed = true;
    }

    /// 転送エラー等で集約を中断する。未処理のバッファは破棄される。
    pub fn fail(&mut self, error: GatewayError) -> GatewayError {
        if !self.phase.is_terminal() {
            self.phase = PullPhase::Failed;
            self.buffer.clear();
        }
        error
    }

    /// 次のイベントを取り出す
    ///
    /// - `Some(Ok(Progress))`: 完結した1行をデコードできた
    /// - `Some(Ok(Completed))`: 入力がクローズされ、全行を処理し終えた
    /// - `Some(Err(_))`: 不正な行を検出し、Failedへ遷移した
    /// - `None`: 追加のチャンクが必要、または終端状態
    pub fn next_event(&mut self) -> Option<GatewayResult<PullEvent>> {
        if self.phase != PullPhase::Streaming {
            return None;
        }

        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(self.decode_line(&line).map(PullEvent::Progress));
        }

        if self.input_closed {
            self.phase = PullPhase::Completed;
            let mut result = std::mem::take(&mut self.result);
            result.final_status = result.records.last().cloned();
            return Some(Ok(PullEvent::Completed(result)));
        }

        None
    }

    fn decode_line(&mut self, line: &[u8]) -> GatewayResult<PullStatus> {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => {
                return Err(self.fail(GatewayError::StreamParseError(format!(
                    "record is not valid UTF-8: {}",
                    e
                ))))
            }
        };

        match serde_json::from_str::<PullRecord>(text) {
            Ok(PullRecord::Status(status)) => {
                self.result.raw.push_str(text);
                self.result.raw.push('\n');
                self.result.records.push(status.clone());
                Ok(status)
            }
            Ok(PullRecord::Failure { error }) => Err(self.fail(GatewayError::PullRejected(error))),
            Err(e) => Err(self.fail(GatewayError::StreamParseError(format!(
                "{} (line: {})",
                e,
                preview(text)
            )))),
        }
    }
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 120;
    if text.chars().count() <= MAX_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_CHARS).collect();
        format!("{}...", head)
    }
}

/// バイトストリームを進捗イベントの遅延ストリームに変換する
///
/// `Completed` またはエラーを1つ返した時点でストリームは終了する。
/// 転送エラーは`BackendUnreachable`として報告される。
pub fn progress_events<S, B, E>(
    aggregator: StreamAggregator,
    body: S,
) -> impl Stream<Item = GatewayResult<PullEvent>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    futures::stream::unfold(Some((aggregator, body)), |state| async move {
        let (mut aggregator, mut body) = state?;
        loop {
            if let Some(event) = aggregator.next_event() {
                let next = match event {
                    Ok(PullEvent::Progress(_)) => Some((aggregator, body)),
                    _ => None,
                };
                return Some((event, next));
            }
            if aggregator.phase().is_terminal() {
                return None;
            }

            match body.next().await {
                Some(Ok(chunk)) => aggregator.push_chunk(chunk.as_ref()),
                Some(Err(err)) => {
                    let error = aggregator.fail(GatewayError::BackendUnreachable(format!(
                        "pull stream interrupted: {}",
                        err
                    )));
                    return Some((Err(error), None));
                }
                None => aggregator.close_input(),
            }
        }
    })
}

/// バイトストリームを最後まで消費して集約結果を返す
///
/// 各進捗レコードは受信順に`on_progress`へ渡される。
pub async fn aggregate<S, B, E, F>(
    aggregator: StreamAggregator,
    body: S,
    mut on_progress: F,
) -> GatewayResult<AggregatedPullResult>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
    F: FnMut(&PullStatus),
{
    let events = progress_events(aggregator, body);
    futures::pin_mut!(events);

    while let Some(event) = events.next().await {
        match event? {
            PullEvent::Progress(status) => on_progress(&status),
            PullEvent::Completed(result) => return Ok(result),
        }
    }

    Err(GatewayError::InvalidResponse(
        "pull stream ended before completion".to_string(),
    ))
}

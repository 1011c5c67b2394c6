use std::io::{self, Read, Write};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::{ProfileError, Result};
use crate::scanner::ContextBuilder;

/// 管道不缓存任何块：生产者每次写入都要等读取端接收
const PIPE_CAPACITY: usize = 0;

type Chunk = std::result::Result<Vec<u8>, ProfileError>;

/// 正在组装中的上下文归档 - 生产者线程写，调用方读
///
/// 每次写入立刻作为一个块发送，不做额外缓冲，读取端看到的条目间隔
/// 就是组装该条目所花的时间。读完、读出错或提前丢弃时都会释放生产者线程，
/// 生产者打开的文件句柄随之关闭。
pub struct ContextArchive {
    receiver: Option<Receiver<Chunk>>,
    producer: Option<JoinHandle<()>>,
    chunk: Vec<u8>,
    position: usize,
}

impl ContextArchive {
    /// 启动生产者线程
    pub fn spawn(builder: ContextBuilder) -> Result<Self> {
        let (sender, receiver) = bounded::<Chunk>(PIPE_CAPACITY);

        let producer = thread::Builder::new()
            .name("context-assembler".to_string())
            .spawn(move || produce(builder, sender))
            .map_err(|source| ProfileError::Assembly {
                path: ".".into(),
                source,
            })?;

        Ok(Self {
            receiver: Some(receiver),
            producer: Some(producer),
            chunk: Vec::new(),
            position: 0,
        })
    }

    /// 生产者是否已经结束并被回收
    pub fn is_released(&self) -> bool {
        self.receiver.is_none() && self.producer.is_none()
    }

    /// 断开管道并等待生产者退出
    fn release(&mut self) {
        // 先丢弃接收端，阻塞在发送上的生产者会立即失败返回
        self.receiver.take();

        if let Some(producer) = self.producer.take() {
            if producer.join().is_err() {
                tracing::error!("归档生产者线程异常退出");
            }
        }
    }
}

impl Read for ContextArchive {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.position >= self.chunk.len() {
            let next = match &self.receiver {
                Some(receiver) => receiver.recv(),
                None => return Ok(0),
            };

            match next {
                Ok(Ok(chunk)) => {
                    self.chunk = chunk;
                    self.position = 0;
                }
                Ok(Err(err)) => {
                    self.release();
                    return Err(io::Error::other(err));
                }
                Err(_) => {
                    // 发送端全部关闭：归档已完整写出
                    self.release();
                    return Ok(0);
                }
            }
        }

        let available = &self.chunk[self.position..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.position += count;
        Ok(count)
    }
}

impl Drop for ContextArchive {
    fn drop(&mut self) {
        self.release();
    }
}

/// 管道写入端
struct ChannelWriter {
    sender: Sender<Chunk>,
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.sender
            .send(Ok(buf.to_vec()))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "归档读取端已关闭"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn produce(builder: ContextBuilder, sender: Sender<Chunk>) {
    let writer = ChannelWriter {
        sender: sender.clone(),
    };

    match builder.write_to(writer) {
        Ok(_) => tracing::debug!("归档组装完成"),
        Err(err) => {
            // 读取端已经离开时没有人需要这个错误
            if sender.send(Err(err)).is_err() {
                tracing::debug!("归档读取端提前关闭");
            }
        }
    }
}

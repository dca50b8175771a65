//! 文档块记录结构
//!
//! 与外部编辑器约定的块形状：
//! `{id, type, value: [{id, type, children, props}], meta: {order, depth}}`。
//! 这里只负责生成这种形状的记录，不关心块的渲染与插件语义。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::image_handler::{ImageDescriptor, ImageError, ImageSizes};

/// 块类型：图片。
pub const IMAGE_BLOCK_TYPE: &str = "Image";
/// 元素类型：图片。
pub const IMAGE_ELEMENT_TYPE: &str = "image";

/// 整个文档：块 id → 块记录。
pub type DocumentValue = BTreeMap<String, Block>;

/// 块排序与层级信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMeta {
    pub order: u32,
    pub depth: u32,
}

/// 叶子文本节点。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextLeaf {
    pub text: String,
}

/// 块内元素。`props` 由块类型决定，因此保持为任意 JSON。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockElement {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub children: Vec<TextLeaf>,
    #[serde(default)]
    pub props: Value,
}

/// 文档块。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub value: Vec<BlockElement>,
    pub meta: BlockMeta,
}

/// 图片元素属性（非可编辑的 void 叶子）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElementProps {
    pub src: String,
    pub alt: String,
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<ImageSizes>,
}

impl Block {
    /// 由图片描述构建完整的块记录；所有字段在提交前一次性构造完成。
    pub fn image(
        block_id: String,
        element_id: String,
        descriptor: &ImageDescriptor,
        order: u32,
    ) -> Result<Self, ImageError> {
        let props = ImageElementProps {
            src: descriptor.src().to_string(),
            alt: descriptor.alt().to_string(),
            node_type: "void".to_string(),
            sizes: descriptor.sizes(),
        };
        let props = serde_json::to_value(props)
            .map_err(|e| ImageError::Document(format!("图片属性序列化失败：{}", e)))?;

        Ok(Self {
            id: block_id,
            block_type: IMAGE_BLOCK_TYPE.to_string(),
            value: vec![BlockElement {
                id: element_id,
                element_type: IMAGE_ELEMENT_TYPE.to_string(),
                children: vec![TextLeaf::default()],
                props,
            }],
            meta: BlockMeta { order, depth: 0 },
        })
    }

    /// 读取图片属性；非图片块返回 `None`。
    pub fn image_props(&self) -> Option<ImageElementProps> {
        if self.block_type != IMAGE_BLOCK_TYPE {
            return None;
        }
        let element = self.value.first()?;
        serde_json::from_value(element.props.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_block_matches_editor_shape() {
        let descriptor = ImageDescriptor::new("https://example.com/a.png", "Pasted image", Some(800), Some(600))
            .expect("descriptor");
        let block = Block::image("b1".to_string(), "e1".to_string(), &descriptor, 3).expect("block");

        let value = serde_json::to_value(&block).expect("serialize");
        assert_eq!(
            value,
            json!({
                "id": "b1",
                "type": "Image",
                "value": [{
                    "id": "e1",
                    "type": "image",
                    "children": [{ "text": "" }],
                    "props": {
                        "src": "https://example.com/a.png",
                        "alt": "Pasted image",
                        "nodeType": "void",
                        "sizes": { "width": 800, "height": 600 }
                    }
                }],
                "meta": { "order": 3, "depth": 0 }
            })
        );
    }

    #[test]
    fn image_props_roundtrip_and_non_image_blocks() {
        let descriptor = ImageDescriptor::new("data:image/png;base64,AAAA", "x", None, None).expect("descriptor");
        let block = Block::image("b".to_string(), "e".to_string(), &descriptor, 0).expect("block");

        let props = block.image_props().expect("image props");
        assert_eq!(props.src, "data:image/png;base64,AAAA");
        assert!(props.sizes.is_none());

        let paragraph = Block {
            id: "p".to_string(),
            block_type: "Paragraph".to_string(),
            value: Vec::new(),
            meta: BlockMeta { order: 0, depth: 0 },
        };
        assert!(paragraph.image_props().is_none());
    }
}
